use bytemuck::{Pod, Zeroable};

use crate::coords::Viewport;
use crate::paint::Color;

use super::common::{primitive_state, uniform_layout_entry};
use super::{DrawTarget, RenderCtx};

/// Copies a sampled texture onto a target, letterboxed to keep its aspect.
///
/// Used to mirror the panel image into the desktop window.
#[derive(Default)]
pub struct BlitRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    sampler: Option<wgpu::Sampler>,
    placement_ubo: Option<wgpu::Buffer>,
}

impl BlitRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears `target` to `background`, then draws `source` centered in it.
    pub fn blit(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut DrawTarget<'_>,
        source: &wgpu::TextureView,
        source_size: (u32, u32),
        background: Color,
    ) {
        self.ensure_pipeline(ctx);
        self.ensure_resources(ctx);

        let (Some(pipeline), Some(bgl), Some(sampler), Some(ubo)) = (
            self.pipeline.as_ref(),
            self.bind_group_layout.as_ref(),
            self.sampler.as_ref(),
            self.placement_ubo.as_ref(),
        ) else {
            return;
        };

        let placement = Placement {
            scale: letterbox_scale(source_size, ctx.viewport),
            _pad: [0.0; 2],
        };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&placement));

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("presence blit bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(source),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("presence blit pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(background.to_wgpu()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, &bind_group, &[]);
        rpass.draw(0..6, 0..1);
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.target_format) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("presence blit shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/blit.wgsl").into()),
        });

        let bind_group_layout = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("presence blit bgl"),
            entries: &[
                uniform_layout_entry(0, wgpu::ShaderStages::VERTEX),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("presence blit pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("presence blit pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.target_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: primitive_state(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.pipeline_format = Some(ctx.target_format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bind_group_layout);
    }

    fn ensure_resources(&mut self, ctx: &RenderCtx<'_>) {
        if self.sampler.is_none() {
            self.sampler = Some(ctx.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("presence blit sampler"),
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                ..Default::default()
            }));
        }
        if self.placement_ubo.is_none() {
            self.placement_ubo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("presence blit placement ubo"),
                size: std::mem::size_of::<Placement>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct Placement {
    scale: [f32; 2],
    _pad: [f32; 2],
}

/// NDC half-extents that fit `source` inside `viewport` without distortion.
pub(crate) fn letterbox_scale(source: (u32, u32), viewport: Viewport) -> [f32; 2] {
    if source.0 == 0 || source.1 == 0 || !viewport.is_valid() {
        return [1.0, 1.0];
    }
    let src_aspect = source.0 as f32 / source.1 as f32;
    let dst_aspect = viewport.width / viewport.height;
    if src_aspect > dst_aspect {
        [1.0, dst_aspect / src_aspect]
    } else {
        [src_aspect / dst_aspect, 1.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_aspect_fills() {
        assert_eq!(letterbox_scale((1024, 768), Viewport::new(800.0, 600.0)), [1.0, 1.0]);
    }

    #[test]
    fn wide_window_pillarboxes() {
        let [sx, sy] = letterbox_scale((1024, 768), Viewport::new(1600.0, 600.0));
        assert_eq!(sy, 1.0);
        assert!((sx - 0.5).abs() < 1e-6);
    }

    #[test]
    fn tall_window_letterboxes() {
        let [sx, sy] = letterbox_scale((1000, 500), Viewport::new(500.0, 500.0));
        assert_eq!(sx, 1.0);
        assert!((sy - 0.5).abs() < 1e-6);
    }

    #[test]
    fn degenerate_inputs_fill() {
        assert_eq!(letterbox_scale((0, 10), Viewport::new(10.0, 10.0)), [1.0, 1.0]);
        assert_eq!(letterbox_scale((10, 10), Viewport::new(0.0, 10.0)), [1.0, 1.0]);
    }
}
