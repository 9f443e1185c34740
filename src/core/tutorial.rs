//! Run-to-completion event handling for the whole tutorial view.
//!
//! Hosts feed `Event`s in arrival order: parameter edits, tab selections,
//! the performance panel's ceiling control, and elapsed wall-clock time. Each
//! event is handled completely before the next; elapsed time is split into
//! individual ticks so every tick sees the state left by the previous one.

use tracing::debug;

use crate::clock::Scheduler;
use crate::config::{ConfigChange, Configuration, ObserverId, ParameterStore, TabId};
use crate::panel::{Panel, PanelOutput};
use crate::router::TabRouter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SetSequenceLength(u32),
    SetHeadDimension(u32),
    /// Raw identifier from the tab bar; unknown ids fall back to `basic`.
    SelectTab(String),
    /// Only meaningful while the performance panel is mounted.
    SetSeriesCeiling(u32),
    Elapsed { ms: u64 },
}

/// What handling one event did, for hosts that redraw selectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Outcome {
    pub config_changed: bool,
    pub tab_switched: bool,
    pub ticks: u32,
}

impl Outcome {
    pub fn needs_redraw(&self) -> bool {
        self.config_changed || self.tab_switched || self.ticks > 0
    }
}

#[derive(Debug)]
pub struct Tutorial {
    store: ParameterStore,
    scheduler: Scheduler,
    router: TabRouter,
}

impl Tutorial {
    /// Mounts the panel of `initial.active_tab` right away.
    pub fn new(initial: Configuration) -> Self {
        let store = ParameterStore::new(initial);
        let mut scheduler = Scheduler::new();
        let mut router = TabRouter::new();
        let config = store.get();
        router.show(config.active_tab, &config, &mut scheduler);
        Self {
            store,
            scheduler,
            router,
        }
    }

    pub fn config(&self) -> Configuration {
        self.store.get()
    }

    pub fn subscribe<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(&Configuration, ConfigChange) + 'static,
    {
        self.store.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.store.unsubscribe(id)
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn panel(&self) -> Option<&Panel> {
        self.router.mounted()
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    pub fn handle(&mut self, event: Event) -> Outcome {
        match event {
            Event::SetSequenceLength(v) => {
                let change = self.store.set_sequence_length(v);
                self.apply(change)
            }
            Event::SetHeadDimension(v) => {
                let change = self.store.set_head_dimension(v);
                self.apply(change)
            }
            Event::SelectTab(id) => {
                let change = self.store.set_active_tab(TabId::resolve(&id));
                self.apply(change)
            }
            Event::SetSeriesCeiling(v) => match self.router.mounted_mut() {
                Some(panel) if panel.tab() == TabId::Performance => {
                    let before = panel.series_ceiling();
                    let after = panel.set_series_ceiling(v);
                    Outcome {
                        config_changed: before != after,
                        ..Outcome::default()
                    }
                }
                _ => {
                    debug!(ceiling = v, "series ceiling ignored outside the performance tab");
                    Outcome::default()
                }
            },
            Event::Elapsed { ms } => Outcome {
                ticks: self.advance(ms),
                ..Outcome::default()
            },
        }
    }

    fn apply(&mut self, change: Option<ConfigChange>) -> Outcome {
        let Some(change) = change else {
            return Outcome::default();
        };
        let config = self.store.get();
        match change {
            ConfigChange::ActiveTab { to, .. } => {
                self.router.show(to, &config, &mut self.scheduler);
                Outcome {
                    tab_switched: true,
                    ..Outcome::default()
                }
            }
            ConfigChange::SequenceLength { .. } | ConfigChange::HeadDimension { .. } => {
                self.router.on_config_changed(&config, &mut self.scheduler);
                Outcome {
                    config_changed: true,
                    ..Outcome::default()
                }
            }
        }
    }

    /// Deliver every tick due within the next `ms` milliseconds, one at a time.
    pub fn advance(&mut self, ms: u64) -> u32 {
        let until = self.scheduler.now_ms().saturating_add(ms);
        let mut delivered = 0;
        while let Some(fired) = self.scheduler.pop_due(until) {
            if self.router.on_tick(fired.task) {
                delivered += 1;
            }
        }
        self.scheduler.settle(until);
        delivered
    }

    pub fn render(&self) -> Option<PanelOutput> {
        self.router.mounted().map(Panel::render)
    }
}

impl Default for Tutorial {
    fn default() -> Self {
        Self::new(Configuration::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::{CLOCK_INPUT, CLOCK_TILE};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn starts_on_the_configured_tab() {
        let t = Tutorial::new(Configuration {
            active_tab: TabId::Tiled,
            ..Configuration::default()
        });
        assert_eq!(t.panel().unwrap().tab(), TabId::Tiled);
        assert_eq!(t.scheduler().active_count(), 1);
    }

    #[test]
    fn tab_round_trip_leaves_no_leaked_tickers() {
        let mut t = Tutorial::default();
        for _ in 0..10 {
            t.handle(Event::SelectTab("flash2".into()));
            t.handle(Event::Elapsed { ms: 700 });
            t.handle(Event::SelectTab("basic".into()));
            t.handle(Event::Elapsed { ms: 300 });
        }
        assert_eq!(t.scheduler().active_count(), 1);
        assert_eq!(t.scheduler().active_names(), vec![CLOCK_INPUT]);
    }

    #[test]
    fn parameter_change_is_seen_by_the_next_tick() {
        let mut t = Tutorial::new(Configuration {
            active_tab: TabId::Tiled,
            ..Configuration::default()
        });
        t.handle(Event::Elapsed { ms: 3000 });
        assert_eq!(t.panel().unwrap().highlight(CLOCK_TILE), Some(3));

        let out = t.handle(Event::SetSequenceLength(1024));
        assert!(out.config_changed);
        assert_eq!(t.panel().unwrap().clock(CLOCK_TILE).unwrap().modulus(), 16);

        let out = t.handle(Event::Elapsed { ms: 1000 });
        assert_eq!(out.ticks, 1);
        assert_eq!(t.panel().unwrap().highlight(CLOCK_TILE), Some(4));
    }

    #[test]
    fn observers_hear_about_every_applied_change() {
        let calls = Rc::new(Cell::new(0));
        let mut t = Tutorial::default();
        t.subscribe({
            let calls = Rc::clone(&calls);
            move |_, _| calls.set(calls.get() + 1)
        });

        t.handle(Event::SetSequenceLength(2048));
        t.handle(Event::SetSequenceLength(2048));
        t.handle(Event::SetHeadDimension(128));
        t.handle(Event::SelectTab("standard".into()));
        t.handle(Event::SelectTab("no-such-tab".into()));
        assert_eq!(calls.get(), 4);
        assert_eq!(t.config().active_tab, TabId::Basic);
    }

    #[test]
    fn ceiling_only_applies_to_performance_panel() {
        let mut t = Tutorial::default();
        assert_eq!(t.handle(Event::SetSeriesCeiling(8192)), Outcome::default());

        t.handle(Event::SelectTab("performance".into()));
        let out = t.handle(Event::SetSeriesCeiling(8192));
        assert!(out.needs_redraw());
        assert_eq!(t.render().unwrap().series.unwrap().len(), 7);

        // The ceiling is panel-local and resets on remount.
        t.handle(Event::SelectTab("basic".into()));
        t.handle(Event::SelectTab("performance".into()));
        assert_eq!(t.render().unwrap().series.unwrap().len(), 6);
    }

    #[test]
    fn elapsed_time_accumulates_across_events() {
        let mut t = Tutorial::default();
        assert_eq!(t.handle(Event::Elapsed { ms: 400 }).ticks, 0);
        assert_eq!(t.handle(Event::Elapsed { ms: 600 }).ticks, 1);
        assert_eq!(t.now_ms(), 1000);
        assert_eq!(t.panel().unwrap().highlight(CLOCK_INPUT), Some(0));
    }
}
