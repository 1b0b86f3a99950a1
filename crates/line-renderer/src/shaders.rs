//! WGSL sources.
//!
//! `aa_common.wgsl` holds the frame uniform block and the screen-space quad
//! routine; it is prepended to every backend so the expansion math exists in
//! exactly one place.

pub const AA_COMMON: &str = include_str!("shaders/aa_common.wgsl");
pub const AA_FRAGMENT: &str = include_str!("shaders/aa_fragment.wgsl");
pub const PLAIN: &str = include_str!("shaders/plain.wgsl");
pub const GEOMETRY_STAGE: &str = include_str!("shaders/geometry_stage.wgsl");
pub const TEX_BUFFER: &str = include_str!("shaders/tex_buffer.wgsl");
pub const SSBO: &str = include_str!("shaders/ssbo.wgsl");
pub const INSTANCING: &str = include_str!("shaders/instancing.wgsl");

fn compose(parts: &[&str]) -> String {
    parts.join("\n")
}

/// Native lines and CPU-expanded quads.
pub fn plain_source() -> String {
    compose(&[AA_COMMON, PLAIN])
}

pub fn geometry_stage_source() -> String {
    compose(&[AA_COMMON, AA_FRAGMENT, GEOMETRY_STAGE])
}

pub fn tex_buffer_source() -> String {
    compose(&[AA_COMMON, AA_FRAGMENT, TEX_BUFFER])
}

pub fn ssbo_source() -> String {
    compose(&[AA_COMMON, AA_FRAGMENT, SSBO])
}

pub fn instancing_source() -> String {
    compose(&[AA_COMMON, AA_FRAGMENT, INSTANCING])
}

pub(crate) fn create_module(device: &wgpu::Device, label: &str, source: String) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use naga::valid::{Capabilities, ValidationFlags, Validator};

    fn validate(name: &str, source: &str) -> naga::Module {
        let module = match naga::front::wgsl::parse_str(source) {
            Ok(module) => module,
            Err(err) => panic!("{name}: {}", err.emit_to_string(source)),
        };
        if let Err(err) = Validator::new(ValidationFlags::all(), Capabilities::default()).validate(&module) {
            panic!("{name}: {err:?}");
        }
        module
    }

    fn entry_points(module: &naga::Module) -> Vec<(String, naga::ShaderStage)> {
        module
            .entry_points
            .iter()
            .map(|ep| (ep.name.clone(), ep.stage))
            .collect()
    }

    #[test]
    fn test_plain_shader_validates() {
        let module = validate("plain", &plain_source());
        let eps = entry_points(&module);
        assert!(eps.contains(&("vs_plain".to_string(), naga::ShaderStage::Vertex)));
        assert!(eps.contains(&("fs_plain".to_string(), naga::ShaderStage::Fragment)));
    }

    #[test]
    fn test_geometry_stage_shader_validates() {
        let module = validate("geometry_stage", &geometry_stage_source());
        let eps = entry_points(&module);
        assert!(eps.contains(&("cs_expand".to_string(), naga::ShaderStage::Compute)));
        assert!(eps.contains(&("vs_expanded".to_string(), naga::ShaderStage::Vertex)));
        assert!(eps.contains(&("fs_aa".to_string(), naga::ShaderStage::Fragment)));
    }

    #[test]
    fn test_tex_buffer_shader_validates() {
        let module = validate("tex_buffer", &tex_buffer_source());
        assert!(entry_points(&module).contains(&("vs_tex_buffer".to_string(), naga::ShaderStage::Vertex)));
    }

    #[test]
    fn test_ssbo_shader_validates() {
        let module = validate("ssbo", &ssbo_source());
        assert!(entry_points(&module).contains(&("vs_ssbo".to_string(), naga::ShaderStage::Vertex)));
    }

    #[test]
    fn test_instancing_shader_validates() {
        let module = validate("instancing", &instancing_source());
        assert!(entry_points(&module).contains(&("vs_instancing".to_string(), naga::ShaderStage::Vertex)));
    }

    #[test]
    fn test_every_aa_backend_shares_one_routine() {
        for source in [geometry_stage_source(), tex_buffer_source(), ssbo_source(), instancing_source()] {
            assert_eq!(source.matches("fn aa_corner(").count(), 1);
            assert!(source.contains("aa_corner("));
        }
    }

    #[test]
    fn test_pull_table_matches_host() {
        // The WGSL table is written out by hand; keep it in step with the host copy
        let table: String = line_geometry::PULL_CORNERS
            .iter()
            .map(|c| format!("vec2<f32>({:.1}, {:.1}),", c.endpoint as f32, c.side))
            .collect::<Vec<_>>()
            .join("\n    ");
        assert!(AA_COMMON.contains(&table), "expected table:\n    {table}");
    }
}
