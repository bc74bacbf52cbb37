use eframe::egui::{self, Color32, RichText};

use headcount::capture::NokhwaCamera;
use headcount::config::Config;
use headcount::gateway::HostedInferenceClient;
use headcount::loader::IMAGE_EXTENSIONS;

use crate::controller::AppController;

pub struct HeadcountApp {
    controller: AppController<HostedInferenceClient>,
    texture: Option<egui::TextureHandle>,
    texture_revision: Option<u64>,
    // set once the "Scanning..." frame went out
    scan_shown: bool,
}

impl HeadcountApp {
    pub fn new(config: Config, gateway: HostedInferenceClient) -> Self {
        Self {
            controller: AppController::new(config, gateway),
            texture: None,
            texture_revision: None,
            scan_shown: false,
        }
    }

    fn pick_image(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file()
        {
            self.controller.select_image(&path);
        }
    }

    fn toggle_camera(&mut self, ctx: &egui::Context) {
        let index = self.controller.config().camera_index;
        let repaint = ctx.clone();
        self.controller.toggle_camera(
            move || NokhwaCamera::open(index),
            Box::new(move || repaint.request_repaint()),
        );
    }

    /// Run the scan only after the busy state has been painted once.
    fn drive_scan(&mut self, ctx: &egui::Context) {
        if !self.controller.state().scanning {
            self.scan_shown = false;
            return;
        }
        if self.scan_shown {
            self.controller.run_pending_scan();
            self.scan_shown = false;
        } else {
            self.scan_shown = true;
        }
        ctx.request_repaint();
    }

    fn sync_texture(&mut self, ctx: &egui::Context) {
        let Some(displayed) = &self.controller.state().displayed else {
            self.texture = None;
            self.texture_revision = None;
            return;
        };
        if self.texture_revision == Some(displayed.revision) {
            return;
        }

        let size = [displayed.image.width() as usize, displayed.image.height() as usize];
        let color_image = egui::ColorImage::from_rgb(size, displayed.image.as_raw());
        match &mut self.texture {
            Some(texture) => texture.set(color_image, egui::TextureOptions::LINEAR),
            None => {
                self.texture =
                    Some(ctx.load_texture("display", color_image, egui::TextureOptions::LINEAR));
            }
        }
        self.texture_revision = Some(displayed.revision);
    }

    fn show_dialog(&mut self) {
        if let Some(message) = self.controller.take_dialog() {
            rfd::MessageDialog::new()
                .set_level(rfd::MessageLevel::Error)
                .set_title("Error")
                .set_description(message)
                .set_buttons(rfd::MessageButtons::Ok)
                .show();
        }
    }
}

impl eframe::App for HeadcountApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drive_scan(ctx);
        self.controller.poll_capture();
        self.sync_texture(ctx);

        let buttons = self.controller.buttons();

        egui::TopBottomPanel::top("actions").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(buttons.select_enabled, egui::Button::new("Select Image"))
                    .clicked()
                {
                    self.pick_image();
                }
                if ui
                    .add_enabled(buttons.scan_enabled, egui::Button::new(buttons.scan_label))
                    .clicked()
                    && self.controller.request_scan()
                {
                    ctx.request_repaint();
                }
                if ui
                    .add_enabled(buttons.camera_enabled, egui::Button::new(buttons.camera_label))
                    .clicked()
                {
                    self.toggle_camera(ctx);
                }
            });
            ui.add_space(6.0);
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(6.0);
                ui.label(RichText::new(&self.controller.state().status).color(Color32::from_gray(200)));
                ui.add_space(6.0);
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.centered_and_justified(|ui| match &self.texture {
                Some(texture) => {
                    ui.add(egui::Image::new(texture).fit_to_original_size(1.0));
                }
                None => {
                    ui.label(RichText::new("No image").color(Color32::from_gray(120)));
                }
            });
        });

        self.show_dialog();
    }
}
