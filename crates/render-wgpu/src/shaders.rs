/// WGSL shader for instanced meshes with one direct light plus ambient.
pub const MESH_SHADER: &str = r#"
struct Light {
    position: vec4<f32>,
    direction: vec4<f32>,
    color: vec4<f32>,
    ambient: vec4<f32>,
};

struct Uniforms {
    view_proj: mat4x4<f32>,
    light: Light,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) color: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);
    let world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_position = world_pos.xyz;
    out.world_normal = normalize(world_normal);
    out.color = instance.color;
    return out;
}

const LIGHT_POINT: f32 = 1.0;
const LIGHT_DIRECTIONAL: f32 = 2.0;
const LIGHT_SPOT: f32 = 3.0;

@fragment
fn fs_main(in: VertexOutput, @builtin(front_facing) front: bool) -> @location(0) vec4<f32> {
    // Unlit material.
    if (in.color.a < 0.5) {
        return vec4<f32>(in.color.rgb, 1.0);
    }

    var normal = normalize(in.world_normal);
    if (!front) {
        normal = -normal;
    }

    let light = uniforms.light;
    let kind = light.position.w;
    var to_light = vec3<f32>(0.0, 0.0, 0.0);
    var falloff = 1.0;

    if (kind == LIGHT_DIRECTIONAL) {
        to_light = -light.direction.xyz;
    } else if (kind == LIGHT_POINT || kind == LIGHT_SPOT) {
        to_light = normalize(light.position.xyz - in.world_position);
        if (kind == LIGHT_SPOT) {
            let cos_angle = dot(-to_light, light.direction.xyz);
            // Hard edge when inner == outer (no penumbra).
            let span = max(light.color.w - light.direction.w, 0.0001);
            let t = clamp((cos_angle - light.direction.w) / span, 0.0, 1.0);
            falloff = t * t * (3.0 - 2.0 * t);
        }
    }

    let diffuse = max(dot(normal, to_light), 0.0) * falloff;
    let lighting = light.ambient.rgb + light.color.rgb * diffuse;
    return vec4<f32>(in.color.rgb * lighting, 1.0);
}
"#;

/// WGSL shader for helper gizmo lines.
pub const LINE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct LineVertex {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct LineOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_line(vertex: LineVertex) -> LineOutput {
    var out: LineOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(vertex.position, 1.0);
    out.color = vertex.color;
    return out;
}

@fragment
fn fs_line(in: LineOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;
