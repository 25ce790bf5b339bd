use std::path::Path;

use anyhow::Result;
use winit::window::Window;

use crate::coords::Viewport;
use crate::device::{Gpu, GpuFrame, GpuInit, SurfaceErrorAction};
use crate::paint::Color;
use crate::render::{GpuImage, Sprite, SpriteDevice, SpritePass, SpriteRenderer};

use super::decode::{check_texture_fits, decode_rgba};
use super::{ImageHandle, ImageRegistry, LoadError, RenderSurface};

/// Window-bound render surface backed by wgpu.
///
/// `clear` acquires the swapchain image and records the clear pass, `draw`
/// queues sprites, `present` records them and submits. A frame whose
/// acquisition failed is skipped silently; draws queued into it are dropped.
/// Draws that fall entirely outside the viewport are culled.
pub struct WgpuSurface<'w> {
    window: &'w Window,
    gpu: Gpu<'w>,
    sprites: SpriteRenderer,
    images: ImageRegistry<GpuImage>,
    clear_color: Color,

    frame: Option<GpuFrame>,
    queued: Vec<(ImageHandle, i32, i32)>,
    lost: bool,
}

impl<'w> WgpuSurface<'w> {
    pub async fn new(window: &'w Window, init: GpuInit, clear_color: Color) -> Result<Self> {
        let gpu = Gpu::new(window, init).await?;
        log::debug!(
            "surface ready: {}x{} {:?}",
            gpu.size().width,
            gpu.size().height,
            gpu.surface_format()
        );

        Ok(Self {
            window,
            gpu,
            sprites: SpriteRenderer::new(),
            images: ImageRegistry::new(),
            clear_color,
            frame: None,
            queued: Vec::new(),
            lost: false,
        })
    }

    pub fn window(&self) -> &'w Window {
        self.window
    }

    pub fn resize(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        self.gpu.resize(size);
    }

    /// Images still referenced by at least one handle.
    pub fn live_images(&self) -> usize {
        self.images.len()
    }

    fn logical_viewport(&self) -> Viewport {
        let size = self.gpu.size();
        let scale = self.window.scale_factor() as f32;
        Viewport::new(size.width as f32 / scale, size.height as f32 / scale)
    }
}

impl RenderSurface for WgpuSurface<'_> {
    fn clear(&mut self) {
        self.queued.clear();
        // A frame left over from a clear without present is discarded.
        self.frame = None;

        let size = self.gpu.size();
        if size.width == 0 || size.height == 0 {
            return;
        }

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                let reason = err.to_string();
                match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => {
                        log::error!("surface lost: {reason}");
                        self.lost = true;
                    }
                    action => log::debug!("frame skipped ({action:?}): {reason}"),
                }
                return;
            }
        };

        let clear = self.clear_color.to_wgpu(self.gpu.surface_format());
        {
            let _rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("proscenium clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        self.frame = Some(frame);
    }

    fn present(&mut self) {
        if let Some(mut frame) = self.frame.take() {
            let viewport = self.logical_viewport();
            let sprites: Vec<Sprite<'_>> = self
                .queued
                .iter()
                .filter(|(handle, x, y)| {
                    let (w, h) = handle.size();
                    viewport.intersects(*x, *y, w, h)
                })
                .filter_map(|(handle, x, y)| {
                    self.images.get(handle).map(|image| Sprite {
                        image,
                        x: *x as f32,
                        y: *y as f32,
                    })
                })
                .collect();

            let device = SpriteDevice {
                device: self.gpu.device(),
                queue: self.gpu.queue(),
                format: self.gpu.surface_format(),
            };
            {
                let mut pass = SpritePass {
                    encoder: &mut frame.encoder,
                    view: &frame.view,
                    viewport,
                };
                self.sprites.render(device, &mut pass, &sprites);
            }

            self.window.pre_present_notify();
            self.gpu.submit(frame);
        }

        self.queued.clear();
        self.images.collect_released();
    }

    fn load_image(&mut self, path: &Path) -> Result<ImageHandle, LoadError> {
        let rgba = decode_rgba(path)?;
        let (w, h) = rgba.dimensions();
        check_texture_fits(path, w, h, self.gpu.device().limits().max_texture_dimension_2d)?;

        let device = SpriteDevice {
            device: self.gpu.device(),
            queue: self.gpu.queue(),
            format: self.gpu.surface_format(),
        };
        let gpu_image = self.sprites.create_image(device, &rgba);

        let handle = self.images.insert(w, h, path, gpu_image);
        log::info!("loaded {} ({w}x{h}) from {}", handle.id(), path.display());
        Ok(handle)
    }

    fn draw(&mut self, image: &ImageHandle, x: i32, y: i32) {
        if self.images.get(image).is_none() {
            log::warn!(
                "unable to draw {} ({}): not loaded on this surface",
                image.id(),
                image.path().display()
            );
            return;
        }
        self.queued.push((image.clone(), x, y));
    }

    fn viewport(&self) -> Viewport {
        self.logical_viewport()
    }

    fn is_lost(&self) -> bool {
        self.lost
    }
}
