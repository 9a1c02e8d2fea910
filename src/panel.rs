use winit::window::Window;

use crate::params::MaterialParams;

/// What a panel pass changed, so the host can write through to the live
/// GPU state before the frame is submitted.
#[derive(Debug, Default, Clone, Copy)]
pub struct PanelChanges {
    pub material_changed: bool,
    pub bloom_changed: bool,
    pub rotation_toggled: bool,
    /// New value of the swoop toggle, when it flipped this pass.
    pub swoop_toggled: Option<bool>,
}

/// The floating parameter panel: one widget per shared parameter, with the
/// bloom entries in their own collapsible section.
pub struct ControlPanel {
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
    visible: bool,
}

impl ControlPanel {
    pub fn new(
        device: &wgpu::Device,
        window: &Window,
        surface_format: wgpu::TextureFormat,
        visible: bool,
    ) -> Self {
        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            device,
            surface_format,
            egui_wgpu::RendererOptions::default(),
        );

        Self {
            egui_ctx,
            egui_state,
            egui_renderer,
            visible,
        }
    }

    /// Let the panel consume a window event first.
    pub fn handle_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        if !self.visible {
            return false;
        }
        self.egui_state.on_window_event(window, event).consumed
    }

    /// Run the panel UI. Edits land in `params` synchronously; the returned
    /// change set tells the host which live state to write through before
    /// this frame is submitted.
    pub fn run(
        &mut self,
        window: &Window,
        params: &mut MaterialParams,
    ) -> (Option<egui::FullOutput>, PanelChanges) {
        let mut changes = PanelChanges::default();
        if !self.visible {
            return (None, changes);
        }

        let raw_input = self.egui_state.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            egui::Window::new("Parameters")
                .resizable(false)
                .default_pos(egui::pos2(10.0, 10.0))
                .default_width(260.0)
                .show(ctx, |ui| {
                    if ui
                        .checkbox(&mut params.enable_swooping_camera, "enableSwoopingCamera")
                        .changed()
                    {
                        changes.swoop_toggled = Some(params.enable_swooping_camera);
                    }
                    if ui
                        .checkbox(&mut params.enable_rotation, "enableRotation")
                        .changed()
                    {
                        changes.rotation_toggled = true;
                    }

                    ui.separator();

                    let slider =
                        |ui: &mut egui::Ui, value: &mut f32, range, label: &str| -> bool {
                            ui.add(egui::Slider::new(value, range).text(label)).changed()
                        };

                    changes.material_changed |=
                        slider(ui, &mut params.transmission, 0.0..=1.0, "transmission");
                    changes.material_changed |=
                        slider(ui, &mut params.thickness, 0.0..=5.0, "thickness");
                    changes.material_changed |=
                        slider(ui, &mut params.roughness, 0.0..=1.0, "roughness");
                    changes.material_changed |= slider(
                        ui,
                        &mut params.env_map_intensity,
                        0.0..=3.0,
                        "envMapIntensity",
                    );
                    changes.material_changed |=
                        slider(ui, &mut params.clearcoat, 0.0..=1.0, "clearcoat");
                    changes.material_changed |= slider(
                        ui,
                        &mut params.clearcoat_roughness,
                        0.0..=1.0,
                        "clearcoatRoughness",
                    );
                    changes.material_changed |=
                        slider(ui, &mut params.normal_scale, 0.0..=5.0, "normalScale");
                    changes.material_changed |= slider(
                        ui,
                        &mut params.clearcoat_normal_scale,
                        0.0..=5.0,
                        "clearcoatNormalScale",
                    );
                    changes.material_changed |= ui
                        .add(
                            egui::Slider::new(&mut params.normal_repeat, 1.0..=4.0)
                                .step_by(1.0)
                                .text("normalRepeat"),
                        )
                        .changed();

                    egui::CollapsingHeader::new("Post Processing")
                        .default_open(true)
                        .show(ui, |ui| {
                            changes.bloom_changed |= slider(
                                ui,
                                &mut params.bloom_threshold,
                                0.0..=1.0,
                                "bloomThreshold",
                            );
                            changes.bloom_changed |= slider(
                                ui,
                                &mut params.bloom_strength,
                                0.0..=5.0,
                                "bloomStrength",
                            );
                            changes.bloom_changed |=
                                slider(ui, &mut params.bloom_radius, 0.0..=1.0, "bloomRadius");
                        });
                });
        });

        (Some(full_output), changes)
    }

    /// Paint the panel as an overlay pass onto the surface view.
    #[allow(clippy::too_many_arguments)]
    pub fn paint(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        window: &Window,
        view: &wgpu::TextureView,
        full_output: egui::FullOutput,
        size_in_pixels: [u32; 2],
        pixels_per_point: f32,
    ) {
        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let tris = self
            .egui_ctx
            .tessellate(full_output.shapes, self.egui_ctx.pixels_per_point());
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels,
            pixels_per_point,
        };

        self.egui_renderer
            .update_buffers(device, queue, encoder, &tris, &screen_descriptor);

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Panel Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            // SAFETY: the render pass borrows the encoder, but egui-wgpu
            // wants 'static. The pass is dropped before the encoder is
            // touched again.
            let render_pass_static = unsafe {
                std::mem::transmute::<&mut wgpu::RenderPass<'_>, &mut wgpu::RenderPass<'static>>(
                    &mut render_pass,
                )
            };

            self.egui_renderer
                .render(render_pass_static, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}
