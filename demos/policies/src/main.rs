use egui_policy_grid::backends::string::StringBackend;
use egui_policy_grid::TableView;
use log::{info, warn};
use policy_grid_core::backend::TableBackend;
use policy_grid_core::{ColumnUid, FilterModel};
use std::collections::BTreeMap;
use std::time::Duration;

const FILTERS_KEY: &str = "policy_filters";
const ACTION_COL: ColumnUid = ColumnUid(4);

struct PoliciesApp {
    backend: StringBackend,
    viewer: TableView,
    status: String,
}

impl PoliciesApp {
    fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut app = PoliciesApp::default();
        if let Some(storage) = cc.storage {
            if let Some(saved) =
                eframe::get_value::<BTreeMap<ColumnUid, FilterModel>>(storage, FILTERS_KEY)
            {
                info!("restoring {} column filters", saved.len());
                app.viewer.load_filters(&mut app.backend, saved);
            }
        }
        app
    }
}

impl Default for PoliciesApp {
    fn default() -> Self {
        let mut backend = StringBackend::new([
            ("Rule", "rule_name"),
            ("Source", "src_ips"),
            ("Destination", "dst_ips"),
            ("Service", "services"),
            ("Action", "action"),
        ])
        .with_latency(Duration::from_millis(300));
        backend.set_value_searchable(ACTION_COL, false);

        let services = ["https", "ssh", "dns", "smtp", "any"];
        for idx in 0..500u32 {
            let service = services[idx as usize % services.len()];
            let action = if idx % 7 == 0 { "deny" } else { "allow" };
            let destination = (idx % 3 != 0).then(|| format!("192.168.{}.10", idx % 16));
            backend.insert_row([
                Some(format!("{action}-{service}-{idx:03}")),
                Some(format!("10.0.{}.{}", idx / 250, idx % 250)),
                destination,
                Some(service.to_string()),
                Some(action.to_string()),
            ]);
        }
        Self {
            backend,
            viewer: TableView::new(),
            status: String::new(),
        }
    }
}

impl eframe::App for PoliciesApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("MenuBar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                egui::widgets::global_theme_preference_buttons(ui);
                ui.separator();

                if ui.button("Clear filters").clicked() {
                    self.viewer.clear_filters(&mut self.backend);
                }
                #[cfg(not(target_arch = "wasm32"))]
                if ui.button("Export CSV…").clicked() {
                    let rows = self.viewer.visible_rows();
                    match egui_policy_grid::util::export_csv_dialog(&self.backend, rows) {
                        Ok(Some(path)) => {
                            self.status = format!("Exported to {}", path.display());
                        }
                        Ok(None) => {}
                        Err(e) => {
                            warn!("export failed: {e}");
                            self.status = format!("Export failed: {e}");
                        }
                    }
                }
                ui.separator();

                ui.label(format!(
                    "{} of {} policies",
                    self.viewer.visible_rows().len(),
                    self.backend.row_count()
                ));
                if self.backend.persistent_flags().search_in_flight {
                    ui.spinner();
                }
                let query = self.backend.value_query();
                if !query.is_empty() {
                    ui.separator();
                    ui.monospace(serde_json::to_string(&query).unwrap_or_default());
                }
                if !self.status.is_empty() {
                    ui.separator();
                    ui.label(&self.status);
                }
            })
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.viewer.show(&mut self.backend, ui);
        });
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, FILTERS_KEY, &self.viewer.save_filters());
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result {
    env_logger::init();

    eframe::run_native(
        "Firewall policies",
        eframe::NativeOptions {
            centered: true,
            ..Default::default()
        },
        Box::new(|cc| Ok(Box::new(PoliciesApp::new(cc)))),
    )
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Redirect `log` message to `console.log` and friends:
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        let start_result = eframe::WebRunner::new()
            .start(
                "the_canvas_id",
                web_options,
                Box::new(|cc| Ok(Box::new(PoliciesApp::new(cc)))),
            )
            .await;

        // Remove the loading text and spinner:
        let loading_text = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("loading_text"));
        if let Some(loading_text) = loading_text {
            match start_result {
                Ok(_) => {
                    loading_text.remove();
                }
                Err(e) => {
                    loading_text.set_inner_html(
                        "<p> The app has crashed. See the developer console for details. </p>",
                    );
                    panic!("Failed to start eframe: {e:?}");
                }
            }
        }
    });
}
