//! Yaddoo Desktop — application entry.

mod app;

use eframe::egui;

fn build_widget() -> anyhow::Result<yaddoo::ChatWidget> {
    let (config, path) = yaddoo::config::load_config(None)?;
    let mut widget = yaddoo::ChatWidget::from_config(&config, &path);
    widget.boot();
    Ok(widget)
}

fn main() -> eframe::Result<()> {
    app::install_logger();

    let widget = match build_widget() {
        Ok(w) => w,
        Err(e) => {
            log::error!("startup failed: {}", e);
            eprintln!("yaddoo-desktop: {:#}", e);
            std::process::exit(1);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([480.0, 760.0])
            .with_min_inner_size([360.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Yaddoo",
        options,
        Box::new(move |cc| Box::new(app::YaddooApp::new(cc, widget))),
    )
}
