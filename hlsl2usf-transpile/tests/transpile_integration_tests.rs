//! End-to-end conversion tests over on-disk fixtures.

use std::path::{Path, PathBuf};

use hlsl2usf_config::{ConstantBufferSamples, Vec4Sample};
use hlsl2usf_transpile::{
    ConversionRequest, ShaderProgram, ShaderStage, TextureSlotMap, TranspileError, convert,
    convert_source, parse_declarations, write_constant_buffers, write_entry_point,
};
use tempfile::TempDir;

const TEMPLATE: &str = "output.BaseColor = o0.xyz;\r\noutput.Opacity = 1;\r\nreturn output;\r\n";

const SINGLE_SAMPLE_PIXEL: &str = "// ps_5_0
Texture2D<float4> t0 : register(t0);
SamplerState s0_s : register(s0);
void main(
  float4 v0 : TEXCOORD0,
  out float4 o0 : SV_Target0)
{
  float4 r0,r1;
  r0.xyzw = t0.Sample(s0_s, v0.xy).xyzw;
  return;
}
";

const MASKED_PIXEL: &str = "// ps_5_0
Texture2D<float4> t2 : register(t2);
Texture2D<float4> t5 : register(t5);
Texture2D<float4> t1 : register(t1);
SamplerState s1_s : register(s1);
cbuffer cb0 : register(b0)
{
  float4 cb0[2];
}
void main(
  float4 v0 : TEXCOORD0,
  float3 v1 : TEXCOORD1,
  out float4 o0 : SV_Target0,
  out float4 o1 : SV_Target1,
  out float4 o2 : SV_Target2)
{
  float4 r0,r1,r2;
  r0.xyzw = t5.Sample(s1_s, v0.xy).xyzw;
  r1.x = cmp(r0.w < cb0[1].x);
  if (r1.x != 0) discard;
  r2.xyz = t1.Sample(s1_s, v0.zw).xyz;
  o0.xyz = r0.xyz * r2.xyz;
  o0.w = 1;
  o1.xyzw = float4(0.5,0.5,1,0);
  o2.xyzw = t2.Sample(s1_s, v0.xy).xyzw;
  return;
}
";

struct Fixture {
    _dir: TempDir,
    template: PathBuf,
    root: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_path_buf();
        let template = root.join("rt_output_conversion.usf");
        std::fs::write(&template, TEMPLATE).unwrap();
        Self {
            _dir: dir,
            template,
            root,
        }
    }

    fn write_source(&self, name: &str, text: &str) -> PathBuf {
        let path = self.root.join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    fn convert(&self, source: &Path, stage: ShaderStage) -> Result<ShaderProgram, TranspileError> {
        convert(&ConversionRequest::new(source, stage, &self.template))
    }
}

fn contents(program: &ShaderProgram) -> Vec<&str> {
    let text = program.contents.as_deref().unwrap();
    text.strip_suffix("\r\n").unwrap().split("\r\n").collect()
}

#[test]
fn test_end_to_end_single_sample_pixel_shader() {
    let fixture = Fixture::new();
    let source = fixture.write_source("PS_single.hlsl", SINGLE_SAMPLE_PIXEL);

    let program = fixture.convert(&source, ShaderStage::Pixel).unwrap();
    let lines = contents(&program);

    assert_eq!(
        lines,
        vec![
            "static float4 v0 = {1, 1, 1, 1};",
            "#define cmp -",
            "struct shader {",
            "FMaterialAttributes main(",
            "   float4 t0,",
            "   float2 tx)",
            "{",
            "  FMaterialAttributes output;",
            "  float4 o0,o1,o2;",
            "  v0.xyzw = v0.xyzw * tx.xyxy;",
            "  float4 r0,r1;",
            "  r0.xyzw = Material_Texture2D_0.SampleLevel(Material_Texture2D_-1Sampler, v0.xy,0).xyzw;",
            "  output.BaseColor = o0.xyz;",
            "  output.Opacity = 1;",
            "  return output;",
            "}",
            "};",
            "shader s;",
            "return s.main(t0,tx);",
        ]
    );
    assert!(!program.opacity_masked());
    assert_eq!(program.declarations.sampler_slots.len(), 1);
}

#[test]
fn test_masked_shader_remaps_and_rewrites_discard() {
    let fixture = Fixture::new();
    let source = fixture.write_source("PS_masked.hlsl", MASKED_PIXEL);

    let program = fixture.convert(&source, ShaderStage::Pixel).unwrap();
    let text = program.contents.as_deref().unwrap();

    assert!(program.opacity_masked());
    // t1 -> 0, t2 -> 1, t5 -> 2
    for rewritten in [
        "  r0.xyzw = Material_Texture2D_2.SampleLevel(Material_Texture2D_0Sampler, v0.xy,0).xyzw;",
        "  r2.xyz = Material_Texture2D_0.SampleLevel(Material_Texture2D_0Sampler, v0.zw,0).xyz;",
        "  o2.xyzw = Material_Texture2D_1.SampleLevel(Material_Texture2D_0Sampler, v0.xy,0).xyzw;",
        "  if (r1.x != 0) { output.OpacityMask = 0; return output; };",
    ] {
        assert!(text.contains(rewritten), "missing: {rewritten}");
    }
    assert!(!text.contains("discard"));
    assert!(text.contains(
        "static float4 cb0[2] = \r\n{\r\nfloat4(1, 1, 1, 1),\r\nfloat4(1, 1, 1, 1),\r\n};\r\n"
    ));
    assert!(text.contains(
        "FMaterialAttributes main(\r\n   float4 t2,\r\n   float4 t5,\r\n   float4 t1,"
    ));
    assert!(text.ends_with("return s.main(t2,t5,t1,tx);\r\n"));
}

#[test]
fn test_slot_remap_is_ascending_rank() {
    let map = TextureSlotMap::from_slots([2, 5, 1]);
    assert_eq!(
        [1, 2, 5].map(|slot| map.rank(slot)),
        [Some(0), Some(1), Some(2)]
    );
}

#[test]
fn test_constant_buffer_without_samples_emits_filler_rows() {
    let program = ShaderProgram::from_source(
        "// ps_5_0\ncbuffer cb3 : register(b3)\n{\n  float4 cb3[4];\n}\n  float4 r0,r1;",
        ShaderStage::Pixel,
    );
    let program = write_constant_buffers(parse_declarations(program), None);

    assert_eq!(
        program.output_lines,
        vec![
            "static float4 cb3[4] = ",
            "{",
            "float4(1, 1, 1, 1),",
            "float4(1, 1, 1, 1),",
            "float4(1, 1, 1, 1),",
            "float4(1, 1, 1, 1),",
            "};",
            "",
        ]
    );
}

#[test]
fn test_constant_buffer_samples_are_keyed_by_count() {
    let fixture = Fixture::new();
    let mut samples = ConstantBufferSamples::new();
    samples.insert(
        2,
        vec![
            Vec4Sample::new(0.25, 0.5, 0.75, 1.0),
            Vec4Sample::new(1.0, 2.0, 3.0, 4.0),
        ],
    );

    let program =
        convert_source(MASKED_PIXEL, ShaderStage::Pixel, Some(&samples), &fixture.template)
            .unwrap();
    let lines = contents(&program);

    assert_eq!(lines[2], "float4(0.250000, 0.500000, 0.750000, 1.000000),");
    assert_eq!(lines[3], "float4(1.000000, 2.000000, 3.000000, 4.000000),");
    assert_eq!(lines[4], "};");
}

#[test]
fn test_float4_input_default_and_scaling() {
    let program = ShaderProgram::from_source(SINGLE_SAMPLE_PIXEL, ShaderStage::Pixel);
    let program = write_entry_point(parse_declarations(program));

    assert!(program.output_lines.contains(&"static float4 v0 = {1, 1, 1, 1};".to_string()));
    assert!(program.output_lines.contains(&"  v0.xyzw = v0.xyzw * tx.xyxy;".to_string()));
}

#[test]
fn test_discard_right_after_sentinel_stops_declaration_parsing() {
    let source = "// ps_5_0
Texture2D<float4> t0 : register(t0);
  float4 r0,r1;
  discard;
Texture2D<float4> t1 : register(t1);
  float4 v3 : TEXCOORD3,
  return;";
    let program = parse_declarations(ShaderProgram::from_source(source, ShaderStage::Pixel));

    assert!(program.opacity_masked());
    assert_eq!(program.declarations.textures.len(), 1);
    assert!(program.declarations.inputs.is_empty());
}

#[test]
fn test_conversion_is_idempotent() {
    let fixture = Fixture::new();
    let source = fixture.write_source("PS_masked.hlsl", MASKED_PIXEL);

    let first = fixture.convert(&source, ShaderStage::Pixel).unwrap();
    let second = fixture.convert(&source, ShaderStage::Pixel).unwrap();
    assert_eq!(first.contents, second.contents);
    assert!(first.contents.is_some());
}

#[test]
fn test_vertex_shader_conversion() {
    let fixture = Fixture::new();
    let source = fixture.write_source(
        "VS_basic.hlsl",
        "// vs_5_0
Texture2D<float4> t3 : register(t3);
void main(
  float3 v0 : POSITION0,
  float2 v1 : TEXCOORD0,
  out float4 o0 : SV_POSITION0,
  out float2 o1 : TEXCOORD0)
{
  float4 r0,r1;
  o0.xyz = v0.xyz;
  return;
}",
    );

    let program = fixture.convert(&source, ShaderStage::Vertex).unwrap();
    let lines = contents(&program);

    assert_eq!(
        &lines[..10],
        &[
            "#define cmp -",
            "struct shader {",
            "float4 o0;",
            "float2 o1;",
            "",
            "void main(",
            "   float4 t3,",
            "   float3 v0, // POSITION0",
            "   float2 v1) // TEXCOORD0",
            "{",
        ]
    );
    assert_eq!(lines.last(), Some(&"};"));
    assert!(!lines.iter().any(|line| line.starts_with("return s.main")));
}

#[test]
fn test_nonexistent_source_fails_without_contents() {
    let fixture = Fixture::new();
    let missing = fixture.root.join("PS_missing.hlsl");

    let err = fixture.convert(&missing, ShaderStage::Pixel).unwrap_err();
    assert!(matches!(err, TranspileError::SourceRead { .. }));
    assert_eq!(err.path(), missing.as_path());
    assert!(err.to_string().contains("PS_missing.hlsl"));
}

#[test]
fn test_missing_template_fails() {
    let fixture = Fixture::new();
    let missing_template = fixture.root.join("nope.usf");

    let result = convert_source(SINGLE_SAMPLE_PIXEL, ShaderStage::Pixel, None, &missing_template);
    assert!(matches!(result, Err(TranspileError::TemplateRead { .. })));
}

#[test]
fn test_crlf_source_matches_lf_source() {
    let fixture = Fixture::new();
    let crlf = SINGLE_SAMPLE_PIXEL.replace('\n', "\r\n");

    let from_lf =
        convert_source(SINGLE_SAMPLE_PIXEL, ShaderStage::Pixel, None, &fixture.template).unwrap();
    let from_crlf = convert_source(&crlf, ShaderStage::Pixel, None, &fixture.template).unwrap();
    assert_eq!(from_lf.contents, from_crlf.contents);
}
