/// WGSL shader shared by every material preset.
///
/// The preset is selected per instance through `flags.x`:
/// 0 basic, 1 normal, 2 matcap, 3 depth, 4 lambert, 5 phong, 6 toon,
/// 7 standard, 8 physical.
pub const MATERIAL_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    view: mat4x4<f32>,
    camera_pos: vec4<f32>,
    light_pos: vec4<f32>,
    // rgb * intensity
    light_color: vec4<f32>,
    // near, far, ambient, unused
    clip: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct InstanceInput {
    @location(3) model_0: vec4<f32>,
    @location(4) model_1: vec4<f32>,
    @location(5) model_2: vec4<f32>,
    @location(6) model_3: vec4<f32>,
    // rgb, opacity
    @location(7) color: vec4<f32>,
    // metalness, roughness, shininess, clearcoat
    @location(8) params: vec4<f32>,
    // specular rgb, sheen
    @location(9) specular: vec4<f32>,
    // mode, flat shading, unused, unused
    @location(10) flags: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) view_depth: f32,
    @location(3) color: vec4<f32>,
    @location(4) params: vec4<f32>,
    @location(5) specular: vec4<f32>,
    @location(6) flags: vec4<f32>,
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
    let view_pos = uniforms.view * world_pos;

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.world_normal = normalize(world_normal);
    out.view_depth = -view_pos.z;
    out.color = instance.color;
    out.params = instance.params;
    out.specular = instance.specular;
    out.flags = instance.flags;
    return out;
}

fn shading_normal(in: VertexOutput, front: bool) -> vec3<f32> {
    // Derivatives must stay in uniform control flow.
    let faceted = normalize(cross(dpdx(in.world_pos), dpdy(in.world_pos)));
    var n = select(normalize(in.world_normal), faceted, in.flags.y > 0.5);
    // Double-sided surfaces light their back face with the flipped normal.
    if (!front) {
        n = -n;
    }
    return n;
}

@fragment
fn fs_main(in: VertexOutput, @builtin(front_facing) front: bool) -> @location(0) vec4<f32> {
    let mode = u32(in.flags.x + 0.5);
    let base = in.color.rgb;
    let n = shading_normal(in, front);
    let to_light = uniforms.light_pos.xyz - in.world_pos;
    let dist2 = max(dot(to_light, to_light), 1e-4);
    let l = normalize(to_light);
    let v = normalize(uniforms.camera_pos.xyz - in.world_pos);
    let h = normalize(l + v);
    let radiance = uniforms.light_color.rgb / dist2;
    let ambient = uniforms.clip.z;
    let n_dot_l = max(dot(n, l), 0.0);

    var rgb = base;
    switch mode {
        case 1u: {
            let view_n = normalize((uniforms.view * vec4<f32>(n, 0.0)).xyz);
            rgb = view_n * 0.5 + vec3<f32>(0.5);
        }
        case 2u: {
            let view_n = normalize((uniforms.view * vec4<f32>(n, 0.0)).xyz);
            rgb = base * (0.35 + 0.65 * max(view_n.z, 0.0));
        }
        case 3u: {
            let t = clamp((in.view_depth - uniforms.clip.x) / (uniforms.clip.y - uniforms.clip.x), 0.0, 1.0);
            rgb = vec3<f32>(1.0 - t);
        }
        case 4u: {
            rgb = base * (ambient + n_dot_l * radiance);
        }
        case 5u: {
            let spec = pow(max(dot(n, h), 0.0), max(in.params.z, 1.0));
            rgb = base * (ambient + n_dot_l * radiance) + in.specular.rgb * spec * radiance;
        }
        case 6u: {
            let band = select(select(0.3, 0.7, n_dot_l > 0.2), 1.0, n_dot_l > 0.7);
            rgb = base * (ambient + band * radiance);
        }
        case 7u, 8u: {
            let metalness = clamp(in.params.x, 0.0, 1.0);
            let roughness = clamp(in.params.y, 0.04, 1.0);
            let f0 = mix(vec3<f32>(0.04), base, metalness);
            let fresnel = f0 + (vec3<f32>(1.0) - f0) * pow(1.0 - max(dot(h, v), 0.0), 5.0);
            let gloss = 2.0 / (roughness * roughness * roughness * roughness) - 2.0;
            let spec = fresnel * pow(max(dot(n, h), 0.0), max(gloss, 1.0)) * (gloss + 2.0) / 8.0;
            let diffuse = base * (1.0 - metalness);
            rgb = diffuse * ambient + (diffuse + spec) * n_dot_l * radiance;
            if (mode == 8u) {
                let coat = in.params.w * pow(max(dot(n, h), 0.0), 256.0) * 0.25;
                let sheen = in.specular.w * pow(1.0 - max(dot(n, v), 0.0), 3.0);
                rgb = rgb + vec3<f32>(coat) * radiance + base * sheen * 0.5;
            }
        }
        default: {}
    }
    return vec4<f32>(rgb, in.color.a);
}
"#;

/// Stretches the offscreen scene texture over the whole swapchain image.
pub const BLIT_SHADER: &str = r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

// One triangle covering the screen: uv (0,0), (2,0), (0,2).
@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> VertexOutput {
    let uv = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));
    var out: VertexOutput;
    out.clip_position = vec4<f32>(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0, 0.0, 1.0);
    out.uv = uv;
    return out;
}

@group(0) @binding(0)
var scene_texture: texture_2d<f32>;
@group(0) @binding(1)
var scene_sampler: sampler;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(scene_texture, scene_sampler, in.uv);
}
"#;
