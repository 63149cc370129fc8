use eframe::egui;

use crate::state::AppState;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct DataExplorerApp {
    pub state: AppState,
}

impl eframe::App for DataExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu + status bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: data source controls ----
        egui::SidePanel::left("controls_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: overview, analysis, filtering ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::central_panel(ui, &mut self.state);
        });
    }
}
