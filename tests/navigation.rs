//! Navigation controller behaviour: parent links, stack restoration around
//! modal loops and hand-offs, and the guards on the open operations.

mod common;

use common::{config_with_feeds, feed, item, Harness};
use newsnav::error::NavError;
use newsnav::external::Launcher;
use newsnav::keymap::Operation;
use newsnav::navigator::Direction;
use newsnav::screens::ScreenKind;
use newsnav::surface::FIELD_MSG;
use newsnav::test_support::{ProbeLog, ProbeScreen, RecordingLauncher, ScriptedDisplay};
use newsnav::{test_support, Navigator, StackEntry, StatusLine};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn push_probe(h: &mut Harness, name: &str, kind: ScreenKind, log: &ProbeLog) {
    let probe = ProbeScreen::new(name, kind, &h.display, log).boxed();
    h.nav.push_screen(probe).unwrap();
}

#[test]
fn test_open_item_list_links_to_previous_screen() {
    let mut h = Harness::new(&[]);
    let log = ProbeLog::default();
    push_probe(&mut h, "root", ScreenKind::FeedList, &log);
    let root = h.nav.current_handle().unwrap();

    let handle = h.nav.open_item_list_at(0).unwrap().unwrap();

    assert_eq!(h.nav.depth(), 2);
    assert_eq!(h.nav.current_handle(), Some(handle));
    assert_eq!(h.nav.current_kind(), Some(ScreenKind::ItemList));
    assert_eq!(h.nav.parent_of(handle), Some(root));
}

#[test]
fn test_empty_feed_is_not_opened() {
    let mut h = Harness::new(&[]);
    let log = ProbeLog::default();
    push_probe(&mut h, "root", ScreenKind::FeedList, &log);

    assert!(h.nav.open_item_list_at(2).unwrap().is_none());
    assert_eq!(h.nav.depth(), 1);
    assert!(h.nav.status_line().current().contains("feed contains no items"));

    let empty = newsnav::feed::Feed::new("", "nothing").into_ref();
    assert!(h.nav.open_search_result(&empty, "zzz").unwrap().is_none());
    assert_eq!(h.nav.depth(), 1);
}

#[test]
fn test_query_feed_is_refreshed_on_open() {
    let mut config = config_with_feeds();
    config.feeds.push(feed("query:Releases:title =~ \"release\"", "", Vec::new()));
    let mut h = Harness::with_config(&[], config);
    let log = ProbeLog::default();
    push_probe(&mut h, "root", ScreenKind::FeedList, &log);

    assert!(h.nav.open_item_list_at(3).unwrap().is_some());
    assert_eq!(h.nav.feeds()[3].borrow().total_count(), 2);
}

#[test]
fn test_broken_query_feed_reports_error() {
    let mut config = config_with_feeds();
    config.feeds.push(feed("query:Broken:title = \"open", "", Vec::new()));
    let mut h = Harness::with_config(&[], config);
    let log = ProbeLog::default();
    push_probe(&mut h, "root", ScreenKind::FeedList, &log);

    assert!(h.nav.open_item_list_at(3).unwrap().is_none());
    assert_eq!(h.nav.depth(), 1);
    assert!(h
        .nav
        .status_line()
        .current()
        .starts_with("Error: applying the filter failed"));
}

#[test]
fn test_open_item_view_requires_item_list() {
    let mut h = Harness::new(&[]);
    let log = ProbeLog::default();
    let rust = Rc::clone(&h.nav.feeds()[0]);

    let err = h.nav.open_item_view(&rust, "r1").unwrap_err();
    assert_eq!(err.downcast_ref::<NavError>(), Some(&NavError::NoCurrentScreen));

    push_probe(&mut h, "root", ScreenKind::FeedList, &log);
    let err = h.nav.open_item_view(&rust, "r1").unwrap_err();
    assert_eq!(
        err.downcast_ref::<NavError>(),
        Some(&NavError::NotItemList(ScreenKind::FeedList))
    );
    assert_eq!(h.nav.depth(), 1);

    let list = h.nav.open_item_list(&rust).unwrap().unwrap();
    let err = h.nav.open_item_view(&rust, "nope").unwrap_err();
    assert_eq!(
        err.downcast_ref::<NavError>(),
        Some(&NavError::UnknownItem("nope".to_string()))
    );

    let view = h.nav.open_item_view(&rust, "r1").unwrap();
    assert_eq!(h.nav.parent_of(view), Some(list));
    assert!(!rust.borrow().items[0].borrow().unread);
}

#[test]
fn test_pop_returns_to_parent_after_reparenting() {
    let mut h = Harness::new(&[]);
    let log = ProbeLog::default();
    push_probe(&mut h, "root", ScreenKind::FeedList, &log);
    push_probe(&mut h, "a", ScreenKind::ItemList, &log);
    push_probe(&mut h, "b", ScreenKind::Article, &log);

    // closing "a" leaves "b" without its parent; it falls back to the root
    h.nav.close_screen(1).unwrap();
    assert_eq!(h.nav.depth(), 2);
    assert_eq!(h.nav.current_kind(), Some(ScreenKind::Article));

    h.nav.pop();
    assert_eq!(h.nav.depth(), 1);
    assert_eq!(h.nav.current_kind(), Some(ScreenKind::FeedList));
    assert_eq!(log.redraws("root"), 1);
}

#[test]
fn test_close_screen_guards() {
    let mut h = Harness::new(&[]);
    let log = ProbeLog::default();
    push_probe(&mut h, "root", ScreenKind::FeedList, &log);
    push_probe(&mut h, "a", ScreenKind::ItemList, &log);

    let err = h.nav.close_screen(0).unwrap_err();
    assert_eq!(err.downcast_ref::<NavError>(), Some(&NavError::RootScreen));
    let err = h.nav.close_screen(1).unwrap_err();
    assert_eq!(err.downcast_ref::<NavError>(), Some(&NavError::InvalidPosition(1)));
    let err = h.nav.close_screen(7).unwrap_err();
    assert_eq!(err.downcast_ref::<NavError>(), Some(&NavError::InvalidPosition(7)));
    assert_eq!(h.nav.depth(), 2);
}

#[test]
fn test_goto_screen_closes_current() {
    let mut h = Harness::new(&[]);
    let log = ProbeLog::default();
    push_probe(&mut h, "root", ScreenKind::FeedList, &log);
    push_probe(&mut h, "a", ScreenKind::ItemList, &log);
    push_probe(&mut h, "b", ScreenKind::Article, &log);
    h.nav.open_dialog_list().unwrap().unwrap();

    let titles: Vec<String> = h.nav.screen_titles().into_iter().map(|(_, t)| t).collect();
    assert_eq!(titles, vec!["root", "a", "b"]);

    h.nav.goto_screen(1).unwrap();
    assert_eq!(h.nav.depth(), 3);
    assert_eq!(h.nav.current_kind(), Some(ScreenKind::ItemList));
    assert_eq!(h.nav.stack().current_index(), 1);
}

#[test]
fn test_dialog_list_is_not_stacked_twice() {
    let mut h = Harness::new(&[]);
    let log = ProbeLog::default();
    push_probe(&mut h, "root", ScreenKind::FeedList, &log);

    assert!(h.nav.open_dialog_list().unwrap().is_some());
    assert!(h.nav.open_dialog_list().unwrap().is_none());
    assert_eq!(h.nav.depth(), 2);
}

#[test]
fn test_empty_url_list_is_not_opened() {
    let mut h = Harness::new(&[]);
    let log = ProbeLog::default();
    push_probe(&mut h, "root", ScreenKind::Article, &log);

    assert!(h.nav.open_url_list(Vec::new()).unwrap().is_none());
    assert_eq!(h.nav.depth(), 1);
    assert_eq!(h.nav.status_line().current(), "URL list empty.");
}

#[test]
fn test_confirm_waits_for_accepted_key() {
    let mut h = Harness::new(&["x", "y"]);
    let log = ProbeLog::default();
    push_probe(&mut h, "root", ScreenKind::FeedList, &log);

    let answer = h.nav.confirm("Really? ", "yn").unwrap();

    assert_eq!(answer, 'y');
    assert_eq!(h.display.remaining(), 0);
    assert_eq!(h.nav.depth(), 1);
    assert_eq!(h.nav.stack().current_index(), 0);
    assert_eq!(
        h.display.field(ScreenKind::FeedList, FIELD_MSG).as_deref(),
        Some("")
    );
}

#[test]
fn test_prompt_collects_typed_text() {
    let mut h = Harness::new(&["r", "u", "x", "BACKSPACE", "s", "SPACE", "t", "ENTER"]);
    let log = ProbeLog::default();
    push_probe(&mut h, "root", ScreenKind::FeedList, &log);

    let answer = h.nav.prompt("Search for: ").unwrap();

    assert_eq!(answer, "rus t");
    assert_eq!(h.display.remaining(), 0);
    assert_eq!(h.nav.depth(), 1);
    assert_eq!(
        h.display.field(ScreenKind::FeedList, FIELD_MSG).as_deref(),
        Some("")
    );
}

#[test]
fn test_prompt_escape_gives_empty_answer() {
    let mut h = Harness::new(&["a", "b", "ESC", "q"]);
    let log = ProbeLog::default();
    push_probe(&mut h, "root", ScreenKind::FeedList, &log);

    let answer = h.nav.prompt("Search for: ").unwrap();

    assert_eq!(answer, "");
    assert_eq!(h.display.remaining(), 1);
    assert!(h.nav.stack().entries().all(|e| !e.is_handoff()));
}

#[test]
fn test_pop_all_empties_stack() {
    let mut h = Harness::new(&[]);
    let log = ProbeLog::default();
    push_probe(&mut h, "root", ScreenKind::FeedList, &log);
    h.nav.open_item_list_at(0).unwrap();
    push_probe(&mut h, "help", ScreenKind::Help, &log);

    h.nav.pop_all();

    assert_eq!(h.nav.depth(), 0);
    assert!(h.nav.current_handle().is_none());
}

#[test]
fn test_unread_step_needs_parent_article_list() {
    let mut h = Harness::new(&[]);
    let log = ProbeLog::default();
    push_probe(&mut h, "root", ScreenKind::FeedList, &log);
    push_probe(&mut h, "article", ScreenKind::Article, &log);
    let viewer = h.nav.current_handle().unwrap();

    let err = h
        .nav
        .step_parent_unread(viewer, Direction::Forward)
        .unwrap_err();

    assert_eq!(err.downcast_ref::<NavError>(), Some(&NavError::NoArticleList));
}

/// Launcher that posts a status message while the terminal is handed over
struct NoisyLauncher(Rc<RefCell<Option<StatusLine>>>);

impl Launcher for NoisyLauncher {
    fn launch(&self, _command_line: &str) -> anyhow::Result<()> {
        if let Some(status) = self.0.borrow().as_ref() {
            status.set_status("Reload check at 12:00:00");
        }
        Ok(())
    }
}

#[test]
fn test_status_is_dropped_during_handoff() {
    let display = ScriptedDisplay::new();
    let status_slot = Rc::new(RefCell::new(None));
    let config = config_with_feeds();
    let mut nav = Navigator::new(
        config.clone(),
        Box::new(display.clone()),
        Box::new(config.keymap.clone()),
        Box::new(NoisyLauncher(Rc::clone(&status_slot))),
    );
    let log = ProbeLog::default();
    nav.push_screen(ProbeScreen::new("root", ScreenKind::FeedList, &display, &log).boxed())
        .unwrap();
    *status_slot.borrow_mut() = Some(nav.status_line());

    nav.open_in_external_process("https://example.com").unwrap();

    assert_eq!(
        display.field(ScreenKind::FeedList, FIELD_MSG).as_deref(),
        Some("")
    );
    nav.set_status("back");
    assert_eq!(nav.status_line().current(), "back");
}

#[test]
fn test_external_open_restores_stack() {
    let mut h = Harness::new(&[]);
    let log = ProbeLog::default();
    push_probe(&mut h, "root", ScreenKind::FeedList, &log);
    push_probe(&mut h, "a", ScreenKind::UrlView, &log);

    h.nav.open_in_external_process("it's").unwrap();

    assert_eq!(h.launcher.commands(), vec!["browser 'it%27s'"]);
    assert_eq!(h.display.resets(), 1);
    assert_eq!(h.nav.depth(), 2);
    assert_eq!(h.nav.current_kind(), Some(ScreenKind::UrlView));
    assert!(h.nav.stack().entries().all(|e| !matches!(e, StackEntry::Handoff)));
}

#[test]
fn test_external_open_failure_restores_stack() {
    let display = ScriptedDisplay::new();
    let launcher = RecordingLauncher::failing("no browser");
    let mut nav = test_support::navigator(&display, &launcher, config_with_feeds());
    let log = ProbeLog::default();
    nav.push_screen(ProbeScreen::new("root", ScreenKind::FeedList, &display, &log).boxed())
        .unwrap();

    let err = nav.open_in_external_process("https://example.com").unwrap_err();

    assert_eq!(err.to_string(), "no browser");
    assert_eq!(nav.depth(), 1);
    assert_eq!(nav.current_kind(), Some(ScreenKind::FeedList));
}

#[test]
fn test_modal_loop_runs_until_its_screen_closes() {
    let display = ScriptedDisplay::with_keys(&["ENTER", "ENTER", "q", "q", "q"]);
    let launcher = RecordingLauncher::new();
    let mut nav = test_support::navigator(&display, &launcher, config_with_feeds());
    let log = ProbeLog::default();
    let depth_after_modal = Rc::new(Cell::new(0));

    let root = {
        let display = display.clone();
        let log = log.clone();
        let depth_after_modal = Rc::clone(&depth_after_modal);
        ProbeScreen::new("root", ScreenKind::FeedList, &display, &log).on(
            Operation::Open,
            move |_, nav| {
                let inner_display = display.clone();
                let inner_log = log.clone();
                let inner = ProbeScreen::new("inner", ScreenKind::SelectTag, &display, &log).on(
                    Operation::Open,
                    move |_, nav| {
                        let third =
                            ProbeScreen::new("third", ScreenKind::Help, &inner_display, &inner_log);
                        nav.push_screen(third.boxed())?;
                        Ok(())
                    },
                );
                nav.run_modal(inner.boxed(), None)?;
                depth_after_modal.set(nav.depth());
                Ok(())
            },
        )
    };

    let err = nav.run(root.boxed()).err();
    assert!(err.is_none(), "loop failed: {:?}", err);

    let ops: Vec<(String, Operation)> = log
        .operations()
        .into_iter()
        .map(|(screen, op, _, _)| (screen, op))
        .collect();
    assert_eq!(
        ops,
        vec![
            ("root".to_string(), Operation::Open),
            ("inner".to_string(), Operation::Open),
            ("third".to_string(), Operation::Quit),
            ("inner".to_string(), Operation::Quit),
            ("root".to_string(), Operation::Quit),
        ]
    );
    assert_eq!(depth_after_modal.get(), 1);
    assert_eq!(nav.depth(), 0);
}

#[test]
fn test_modal_result_field_is_returned() {
    let display = ScriptedDisplay::with_keys(&["DOWN", "ENTER"]);
    let launcher = RecordingLauncher::new();
    let mut nav = test_support::navigator(&display, &launcher, config_with_feeds());
    let log = ProbeLog::default();
    nav.push_screen(ProbeScreen::new("root", ScreenKind::FeedList, &display, &log).boxed())
        .unwrap();

    let tag = nav
        .open_tag_picker(vec!["linux".to_string(), "rust".to_string()])
        .unwrap();

    assert_eq!(tag, "rust");
    assert_eq!(nav.depth(), 1);
    assert_eq!(nav.current_kind(), Some(ScreenKind::FeedList));
}

#[test]
fn test_visible_feeds_reports_filter_errors() {
    let mut h = Harness::new(&[]);
    let log = ProbeLog::default();
    push_probe(&mut h, "root", ScreenKind::FeedList, &log);

    assert_eq!(h.nav.visible_feeds(None), Some(vec![0, 1, 2]));
    assert_eq!(h.nav.visible_feeds(Some("title = \"Linux\"")), Some(vec![1]));
    assert_eq!(h.nav.visible_feeds(Some("title = ")), None);
    assert!(h.nav.status_line().current().starts_with("Error:"));
}

#[test]
fn test_unread_feed_search() {
    let mut config = config_with_feeds();
    config.feeds.push(feed("https://example.com/go.xml", "Go", vec![item("g1", "Generics")]));
    let h = Harness::with_config(&[], config);

    assert_eq!(h.nav.unread_feed_from(0, Direction::Forward), Some(1));
    assert_eq!(h.nav.unread_feed_from(1, Direction::Forward), Some(3));
    assert_eq!(h.nav.unread_feed_from(3, Direction::Backward), Some(1));
    assert_eq!(h.nav.unread_feed_from(0, Direction::Backward), None);
}
