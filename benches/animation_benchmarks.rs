//! 动画管线性能基准测试
//!
//! 测试关键帧采样与整树姿态评估的性能

use character_animation::*;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{Mat4, Quat, Vec3};

/// 构建一条 `bone_count` 节骨骼链，每个节点都有满配动画通道
fn chain_scene(bone_count: usize, keys_per_track: usize) -> ImportedScene {
    let mut nodes = Vec::with_capacity(bone_count + 1);
    let mut root = SceneNode::new("root", Mat4::IDENTITY);
    if bone_count > 0 {
        root.children.push(1);
    }
    nodes.push(root);

    let mut bones = Vec::with_capacity(bone_count);
    let mut channels = Vec::with_capacity(bone_count);

    for i in 0..bone_count {
        let name = format!("bone_{}", i);
        let mut node = SceneNode::new(name.clone(), Mat4::from_translation(Vec3::Y));
        if i + 1 < bone_count {
            node.children.push(i + 2);
        }
        nodes.push(node);

        bones.push(BoneData {
            name: name.clone(),
            offset_matrix: Mat4::IDENTITY,
            weights: vec![BoneWeight {
                vertex: i as u32,
                weight: 1.0,
            }],
        });

        let mut channel = NodeChannel::new(name);
        for k in 0..keys_per_track {
            let t = k as f32;
            channel
                .position_keys
                .push(Keyframe::new(t, Vec3::new(t, 0.0, 0.0)));
            channel
                .rotation_keys
                .push(Keyframe::new(t, Quat::from_rotation_y(t * 0.1)));
            channel.scale_keys.push(Keyframe::new(t, Vec3::ONE));
        }
        channels.push(channel);
    }

    ImportedScene {
        nodes,
        root: 0,
        meshes: vec![MeshBones {
            base_vertex: 0,
            vertex_count: bone_count as u32,
            bones,
        }],
        animations: vec![AnimationData {
            name: "bench".to_string(),
            duration_ticks: (keys_per_track - 1) as f32,
            ticks_per_second: 25.0,
            channels,
        }],
    }
}

fn bench_pose_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("pose_evaluation");

    for bone_count in [10, 50, 100] {
        let scene = chain_scene(bone_count, 30);
        let character =
            AnimatedCharacter::from_scene(scene, &AnimationConfig::default()).unwrap();

        group.bench_with_input(
            BenchmarkId::from_parameter(bone_count),
            &character,
            |b, character| {
                let mut elapsed = 0.0f32;
                b.iter(|| {
                    elapsed += 0.016;
                    black_box(character.bone_transforms(elapsed).unwrap())
                });
            },
        );
    }

    group.finish();
}

fn bench_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("keyframe_sampling");

    let mut channel = NodeChannel::new("node");
    for k in 0..60 {
        let t = k as f32;
        channel.position_keys.push(Keyframe::new(t, Vec3::new(t, 0.0, 0.0)));
        channel
            .rotation_keys
            .push(Keyframe::new(t, Quat::from_rotation_y(t * 0.05)));
    }

    group.bench_function("position_lerp", |b| {
        b.iter(|| black_box(AnimationSampler::sample_position(&channel, 29.5).unwrap()));
    });

    group.bench_function("rotation_slerp", |b| {
        b.iter(|| black_box(AnimationSampler::sample_rotation(&channel, 29.5).unwrap()));
    });

    group.finish();
}

fn bench_vertex_binding(c: &mut Criterion) {
    let mut group = c.benchmark_group("vertex_binding");

    group.bench_function("bind_10k_vertices", |b| {
        b.iter(|| {
            let mut binder = VertexBoneBinder::new(10_000, OverflowPolicy::Fail);
            for vertex in 0..10_000usize {
                for bone in 0..4u32 {
                    binder.add_influence(vertex, bone, 0.25).unwrap();
                }
            }
            black_box(binder.packed_buffer())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_pose_evaluation, bench_sampling, bench_vertex_binding);
criterion_main!(benches);
