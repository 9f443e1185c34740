//! Tab Router: exactly one mounted panel for the visible view.

use tracing::info;

use crate::clock::{Scheduler, TaskId};
use crate::config::{Configuration, TabId};
use crate::panel::{Panel, PanelOutput};

#[derive(Debug, Default)]
pub struct TabRouter {
    mounted: Option<Panel>,
    switches: u64,
}

impl TabRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mounted(&self) -> Option<&Panel> {
        self.mounted.as_ref()
    }

    pub fn mounted_mut(&mut self) -> Option<&mut Panel> {
        self.mounted.as_mut()
    }

    pub fn active_tab(&self) -> Option<TabId> {
        self.mounted.as_ref().map(Panel::tab)
    }

    /// Number of panel swaps performed so far.
    pub fn switches(&self) -> u64 {
        self.switches
    }

    /// Mount the panel for `tab`, tearing down the current one first.
    /// Showing the tab that is already mounted keeps its state.
    pub fn show(&mut self, tab: TabId, config: &Configuration, scheduler: &mut Scheduler) {
        if self.active_tab() == Some(tab) {
            return;
        }
        let from = self.active_tab();
        if let Some(old) = self.mounted.take() {
            old.unmount(scheduler);
        }
        self.mounted = Some(Panel::mount(tab, config, scheduler));
        self.switches += 1;
        info!(
            from = from.map(TabId::label).unwrap_or("-"),
            to = %tab,
            live_tasks = scheduler.active_count(),
            "tab switched"
        );
    }

    /// Resolve a raw identifier (unknown ones fall back to the default panel)
    /// and show it.
    pub fn show_id(
        &mut self,
        id: &str,
        config: &Configuration,
        scheduler: &mut Scheduler,
    ) -> TabId {
        let tab = TabId::resolve(id);
        self.show(tab, config, scheduler);
        tab
    }

    /// Make sure `tab` is the mounted panel under `config`, then render it.
    pub fn render(
        &mut self,
        tab: TabId,
        config: &Configuration,
        scheduler: &mut Scheduler,
    ) -> PanelOutput {
        self.show(tab, config, scheduler);
        let panel = self
            .mounted
            .get_or_insert_with(|| Panel::mount(tab, config, scheduler));
        if panel.config() != config {
            panel.on_config_changed(config, scheduler);
        }
        panel.render()
    }

    pub fn on_config_changed(&mut self, config: &Configuration, scheduler: &mut Scheduler) {
        if let Some(panel) = self.mounted.as_mut() {
            panel.on_config_changed(config, scheduler);
        }
    }

    /// Route a fired tick to the mounted panel. Ticks of torn-down panels
    /// cannot arrive here because their tasks were cancelled on unmount.
    pub fn on_tick(&mut self, task: TaskId) -> bool {
        self.mounted
            .as_mut()
            .map(|p| p.on_tick(task))
            .unwrap_or(false)
    }

    pub fn unmount(&mut self, scheduler: &mut Scheduler) {
        if let Some(old) = self.mounted.take() {
            old.unmount(scheduler);
        }
    }
}
