#![warn(clippy::all, rust_2018_idioms)]

use std::path::PathBuf;
use std::process::ExitCode;

use eframe_markup::loader::ImageSource;
use eframe_markup::MarkupApp;
use log::{error, info};

fn main() -> ExitCode {
    env_logger::init(); // RUST_LOG=debug for verbose output

    let mut args = std::env::args().skip(1);
    let Some(image_path) = args.next().map(PathBuf::from) else {
        eprintln!("usage: eframe_markup <image> [output.png]");
        return ExitCode::FAILURE;
    };
    let output_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("markup-output.png"));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 700.0])
            .with_title("Markup"),
        ..Default::default()
    };

    let result = eframe::run_native(
        "eframe_markup",
        options,
        Box::new(move |cc| {
            let save_path = output_path.clone();
            let app = MarkupApp::new(cc, ImageSource::Path(image_path))
                .with_on_save(move |png| match std::fs::write(&save_path, &png) {
                    Ok(()) => info!("wrote {}", save_path.display()),
                    Err(err) => error!("could not write {}: {err}", save_path.display()),
                })
                .with_on_close(|| info!("closed without saving"));
            Ok(Box::new(app))
        }),
    );

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("eframe failed: {err}");
            ExitCode::FAILURE
        }
    }
}
