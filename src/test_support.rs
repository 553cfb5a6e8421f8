//! Test doubles for the navigation core.
//!
//! [`ScriptedDisplay`] hands out surfaces that replay one shared input
//! script, so a test can drive the real dispatch loop key by key. Once the
//! script runs dry every poll fails, which ends the loop with an error
//! instead of hanging the test.

use crate::config::Config;
use crate::external::Launcher;
use crate::keymap::Operation;
use crate::navigator::Navigator;
use crate::screens::{Screen, ScreenKind};
use crate::surface::{self, share, Display, SharedSurface, Surface, Timeout};
use anyhow::{anyhow, bail, Result};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::sync::{Arc, Mutex, PoisonError};

/// Key name in a script that stands for a poll timeout
pub const TIMEOUT: &str = "TIMEOUT";

#[derive(Debug, Default)]
struct Script {
    events: VecDeque<Option<String>>,
    polls: usize,
}

type SharedScript = Arc<Mutex<Script>>;

fn script_events<'a>(keys: &'a [&'a str]) -> impl Iterator<Item = Option<String>> + 'a {
    keys.iter()
        .map(|key| (*key != TIMEOUT).then(|| (*key).to_string()))
}

/// In-memory surface
#[derive(Debug, Default)]
pub struct ScriptedSurface {
    fields: HashMap<String, String>,
    draws: usize,
    script: Option<SharedScript>,
}

impl ScriptedSurface {
    /// A surface without input; polling it fails
    pub fn detached() -> Self {
        Self::default()
    }

    /// A surface replaying the given keys
    pub fn with_keys(keys: &[&str]) -> Self {
        let script = Script {
            events: script_events(keys).collect(),
            polls: 0,
        };
        Self {
            script: Some(Arc::new(Mutex::new(script))),
            ..Self::default()
        }
    }

    pub fn draws(&self) -> usize {
        self.draws
    }
}

impl Surface for ScriptedSurface {
    fn set(&mut self, name: &str, value: &str) {
        self.fields.insert(name.to_string(), value.to_string());
    }

    fn get(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    fn draw(&mut self) -> Result<()> {
        self.draws += 1;
        Ok(())
    }

    fn poll_event(&mut self, _timeout: Timeout) -> Result<Option<String>> {
        self.draw()?;
        let script = self
            .script
            .as_ref()
            .ok_or_else(|| anyhow!("surface has no input script"))?;
        let mut script = script.lock().unwrap_or_else(PoisonError::into_inner);
        script.polls += 1;
        match script.events.pop_front() {
            Some(event) => Ok(event),
            None => bail!("input script exhausted"),
        }
    }
}

/// Display whose surfaces all read from one input script
#[derive(Clone, Default)]
pub struct ScriptedDisplay {
    script: SharedScript,
    resets: Rc<Cell<usize>>,
    surfaces: Rc<RefCell<Vec<(ScreenKind, SharedSurface)>>>,
}

impl ScriptedDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Display replaying `keys`; [`TIMEOUT`] entries simulate poll timeouts
    pub fn with_keys(keys: &[&str]) -> Self {
        let display = Self::new();
        display.push_keys(keys);
        display
    }

    pub fn push_keys(&self, keys: &[&str]) {
        self.lock_script().events.extend(script_events(keys));
    }

    fn lock_script(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of polls served so far, across all surfaces
    pub fn polls(&self) -> usize {
        self.lock_script().polls
    }

    /// Number of events not consumed yet
    pub fn remaining(&self) -> usize {
        self.lock_script().events.len()
    }

    pub fn resets(&self) -> usize {
        self.resets.get()
    }

    /// Every surface created for screens of this kind, oldest first
    pub fn surfaces(&self, kind: ScreenKind) -> Vec<SharedSurface> {
        self.surfaces
            .borrow()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, s)| SharedSurface::clone(s))
            .collect()
    }

    /// Value of a field on the newest surface of this kind
    pub fn field(&self, kind: ScreenKind, name: &str) -> Option<String> {
        self.surfaces(kind)
            .last()
            .map(|surface| surface::lock(surface).get(name))
    }
}

impl Display for ScriptedDisplay {
    fn new_surface(&self, kind: ScreenKind) -> SharedSurface {
        let surface = share(ScriptedSurface {
            script: Some(Arc::clone(&self.script)),
            ..ScriptedSurface::default()
        });
        self.surfaces
            .borrow_mut()
            .push((kind, SharedSurface::clone(&surface)));
        surface
    }

    fn reset(&self) -> Result<()> {
        self.resets.set(self.resets.get() + 1);
        Ok(())
    }
}

/// Launcher that records command lines instead of running them
#[derive(Clone, Default)]
pub struct RecordingLauncher {
    commands: Rc<RefCell<Vec<String>>>,
    failure: Option<String>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// A launcher whose every launch fails with `message`
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }
}

impl Launcher for RecordingLauncher {
    fn launch(&self, command_line: &str) -> Result<()> {
        self.commands.borrow_mut().push(command_line.to_string());
        match &self.failure {
            Some(message) => bail!("{}", message),
            None => Ok(()),
        }
    }
}

/// Something a [`ProbeScreen`] observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeEvent {
    Init(String),
    Prepare(String),
    Operation {
        screen: String,
        op: Operation,
        automatic: bool,
        args: Vec<String>,
    },
    Redraw(String),
    Layout(String),
    Tick(String),
}

/// Shared journal of probe screen callbacks
#[derive(Clone, Default)]
pub struct ProbeLog {
    events: Rc<RefCell<Vec<ProbeEvent>>>,
}

impl ProbeLog {
    fn record(&self, event: ProbeEvent) {
        self.events.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<ProbeEvent> {
        self.events.borrow().clone()
    }

    /// Operations received, as `(screen, op, automatic, args)`
    pub fn operations(&self) -> Vec<(String, Operation, bool, Vec<String>)> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                ProbeEvent::Operation {
                    screen,
                    op,
                    automatic,
                    args,
                } => Some((screen.clone(), *op, *automatic, args.clone())),
                _ => None,
            })
            .collect()
    }

    fn count(&self, wanted: impl Fn(&ProbeEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| wanted(e)).count()
    }

    pub fn redraws(&self, name: &str) -> usize {
        self.count(|e| matches!(e, ProbeEvent::Redraw(n) if n == name))
    }

    pub fn ticks(&self, name: &str) -> usize {
        self.count(|e| matches!(e, ProbeEvent::Tick(n) if n == name))
    }

    pub fn prepares(&self, name: &str) -> usize {
        self.count(|e| matches!(e, ProbeEvent::Prepare(n) if n == name))
    }
}

type ProbeHook = Box<dyn FnMut(&SharedSurface, &mut Navigator) -> Result<()>>;

/// Screen that journals every callback. `Quit` pops it unless a hook for
/// `Quit` is installed.
pub struct ProbeScreen {
    name: String,
    kind: ScreenKind,
    surface: SharedSurface,
    log: ProbeLog,
    hooks: HashMap<Operation, ProbeHook>,
}

impl ProbeScreen {
    pub fn new(name: &str, kind: ScreenKind, display: &dyn Display, log: &ProbeLog) -> Self {
        Self {
            name: name.to_string(),
            kind,
            surface: display.new_surface(kind),
            log: log.clone(),
            hooks: HashMap::new(),
        }
    }

    /// Run `hook` whenever `op` arrives
    pub fn on<F>(mut self, op: Operation, hook: F) -> Self
    where
        F: FnMut(&SharedSurface, &mut Navigator) -> Result<()> + 'static,
    {
        self.hooks.insert(op, Box::new(hook));
        self
    }

    pub fn boxed(self) -> Box<dyn Screen> {
        Box::new(self)
    }
}

impl Screen for ProbeScreen {
    fn kind(&self) -> ScreenKind {
        self.kind
    }

    fn title(&self) -> String {
        self.name.clone()
    }

    fn surface(&self) -> SharedSurface {
        SharedSurface::clone(&self.surface)
    }

    fn init(&mut self) -> Result<()> {
        self.log.record(ProbeEvent::Init(self.name.clone()));
        Ok(())
    }

    fn prepare(&mut self, _nav: &Navigator) -> Result<()> {
        self.log.record(ProbeEvent::Prepare(self.name.clone()));
        Ok(())
    }

    fn process_operation(
        &mut self,
        op: Operation,
        automatic: bool,
        args: &[String],
        nav: &mut Navigator,
    ) -> Result<()> {
        self.log.record(ProbeEvent::Operation {
            screen: self.name.clone(),
            op,
            automatic,
            args: args.to_vec(),
        });
        if let Some(hook) = self.hooks.get_mut(&op) {
            return hook(&self.surface, nav);
        }
        if op == Operation::Quit {
            nav.pop();
        }
        Ok(())
    }

    fn set_redraw(&mut self, redraw: bool) {
        if redraw {
            self.log.record(ProbeEvent::Redraw(self.name.clone()));
        }
    }

    fn recalculate_layout(&mut self) {
        self.log.record(ProbeEvent::Layout(self.name.clone()));
    }

    fn update_percent(&mut self) {
        self.log.record(ProbeEvent::Tick(self.name.clone()));
    }
}

/// Navigator wired to scripted collaborators, using the configured keymap
pub fn navigator(display: &ScriptedDisplay, launcher: &RecordingLauncher, config: Config) -> Navigator {
    let keys = Box::new(config.keymap.clone());
    let feeds = config.build_feeds();
    Navigator::new(config, Box::new(display.clone()), keys, Box::new(launcher.clone())).with_feeds(feeds)
}
