//! glTF 导入前端
//!
//! 把 glTF 文件转换成通用的 [`ImportedScene`]：节点 arena、
//! 逐骨骼的顶点权重列表和按节点划分的动画通道。
//! glTF 的关键帧时间以秒计，这里按每秒 1 刻度直接透传。

use glam::{Mat4, Quat, Vec3};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{AnimationError, AnimationResult};
use crate::scene::{
    AnimationData, BoneData, BoneWeight, ImportedScene, Keyframe, MeshBones, NodeChannel,
    SceneNode,
};

/// 从 glTF 文件导入场景
///
/// 导入失败时携带文件路径与导入库的诊断信息返回
/// [`AnimationError::ImportFailed`]。
pub fn load_gltf<P: AsRef<Path>>(path: P) -> AnimationResult<ImportedScene> {
    let path_display = path.as_ref().display().to_string();
    let (document, buffers, _images) =
        gltf::import(&path).map_err(|e| AnimationError::ImportFailed {
            path: path_display.clone(),
            message: e.to_string(),
        })?;

    let nodes = build_node_arena(&document);
    let root = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .and_then(|scene| scene.nodes().next())
        .map(|node| node.index())
        .unwrap_or(0);

    let meshes = build_mesh_bones(&document, &buffers);
    let animations = build_animations(&document, &buffers);

    log::info!(
        "imported '{}': {} nodes, {} skinned meshes, {} animations",
        path_display,
        nodes.len(),
        meshes.len(),
        animations.len()
    );

    Ok(ImportedScene {
        nodes,
        root,
        meshes,
        animations,
    })
}

/// 节点名称；未命名节点按索引合成
fn node_label(node: &gltf::Node) -> String {
    node.name()
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("node_{}", node.index()))
}

/// glTF 节点索引即 arena 索引，子节点关系直接照搬
fn build_node_arena(document: &gltf::Document) -> Vec<SceneNode> {
    document
        .nodes()
        .map(|node| {
            let mut scene_node = SceneNode::new(
                node_label(&node),
                Mat4::from_cols_array_2d(&node.transform().matrix()),
            );
            scene_node.children = node.children().map(|c| c.index()).collect();
            scene_node
        })
        .collect()
}

/// 逐蒙皮网格收集骨骼定义与顶点权重
///
/// glTF 把权重存在顶点属性（JOINTS_0/WEIGHTS_0）里，这里反转成
/// 逐骨骼的 (顶点, 权重) 列表，与导入场景模型一致。
fn build_mesh_bones(document: &gltf::Document, buffers: &[gltf::buffer::Data]) -> Vec<MeshBones> {
    let mut meshes = Vec::new();
    let mut base_vertex = 0u32;

    for node in document.nodes() {
        let (mesh, skin) = match (node.mesh(), node.skin()) {
            (Some(mesh), Some(skin)) => (mesh, skin),
            _ => continue,
        };

        let joints: Vec<gltf::Node> = skin.joints().collect();
        let skin_reader = skin.reader(|buffer| buffers.get(buffer.index()).map(|d| d.0.as_slice()));
        let offset_matrices: Vec<Mat4> = skin_reader
            .read_inverse_bind_matrices()
            .map(|iter| iter.map(|m| Mat4::from_cols_array_2d(&m)).collect())
            .unwrap_or_else(|| vec![Mat4::IDENTITY; joints.len()]);

        for primitive in mesh.primitives() {
            let reader =
                primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| d.0.as_slice()));

            let vertex_count = reader
                .read_positions()
                .map(|positions| positions.len())
                .unwrap_or(0);

            let mut per_bone: Vec<Vec<BoneWeight>> = vec![Vec::new(); joints.len()];
            if let (Some(joint_sets), Some(weight_sets)) =
                (reader.read_joints(0), reader.read_weights(0))
            {
                for (vertex, (ids, weights)) in joint_sets
                    .into_u16()
                    .zip(weight_sets.into_f32())
                    .enumerate()
                {
                    for k in 0..4 {
                        let joint = ids[k] as usize;
                        if weights[k] > 0.0 && joint < per_bone.len() {
                            per_bone[joint].push(BoneWeight {
                                vertex: vertex as u32,
                                weight: weights[k],
                            });
                        }
                    }
                }
            }

            let bones = joints
                .iter()
                .zip(offset_matrices.iter())
                .zip(per_bone)
                .map(|((joint, offset_matrix), weights)| BoneData {
                    name: node_label(joint),
                    offset_matrix: *offset_matrix,
                    weights,
                })
                .collect();

            meshes.push(MeshBones {
                base_vertex,
                vertex_count: vertex_count as u32,
                bones,
            });
            base_vertex += vertex_count as u32;
        }
    }

    meshes
}

/// 把轨道两端补齐到整段动画的时间范围
///
/// glTF 允许采样器的输入区间短于动画本身，区间外取值保持最近的
/// 关键帧。评估端按完整时间轴找插值区间，这里在 0 和结尾补上
/// 保持值的边界关键帧。
fn pad_track_to_duration<T: Copy>(keys: &mut Vec<Keyframe<T>>, duration: f32) {
    let (first, last) = match (keys.first(), keys.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return,
    };
    if first.time > 0.0 {
        keys.insert(0, Keyframe::new(0.0, first.value));
    }
    if last.time < duration {
        keys.push(Keyframe::new(duration, last.value));
    }
}

fn build_animations(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
) -> Vec<AnimationData> {
    use gltf::animation::util::ReadOutputs;

    document
        .animations()
        .enumerate()
        .map(|(index, animation)| {
            let name = animation
                .name()
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("animation_{}", index));

            // 节点索引 -> 通道，同一节点的三条轨道聚到一个通道里
            let mut channels: HashMap<usize, NodeChannel> = HashMap::new();
            let mut duration = 0.0f32;

            for channel in animation.channels() {
                let target = channel.target().node();
                let reader =
                    channel.reader(|buffer| buffers.get(buffer.index()).map(|d| d.0.as_slice()));

                let times: Vec<f32> = reader
                    .read_inputs()
                    .map(|iter| iter.collect())
                    .unwrap_or_default();
                if let Some(last) = times.last() {
                    duration = duration.max(*last);
                }

                let entry = channels
                    .entry(target.index())
                    .or_insert_with(|| NodeChannel::new(node_label(&target)));

                match reader.read_outputs() {
                    Some(ReadOutputs::Translations(iter)) => {
                        entry.position_keys = times
                            .iter()
                            .zip(iter)
                            .map(|(t, v)| Keyframe::new(*t, Vec3::from(v)))
                            .collect();
                    }
                    Some(ReadOutputs::Rotations(rotations)) => {
                        entry.rotation_keys = times
                            .iter()
                            .zip(rotations.into_f32())
                            .map(|(t, q)| Keyframe::new(*t, Quat::from_array(q)))
                            .collect();
                    }
                    Some(ReadOutputs::Scales(iter)) => {
                        entry.scale_keys = times
                            .iter()
                            .zip(iter)
                            .map(|(t, v)| Keyframe::new(*t, Vec3::from(v)))
                            .collect();
                    }
                    // 形变目标动画不在本管线范围内
                    Some(ReadOutputs::MorphTargetWeights(_)) | None => {}
                }
            }

            // 补齐缺失的轨道：用节点静态变换的分解值作为单关键帧常量，
            // 满足每条序列至少一个关键帧的不变量
            for (node_index, channel) in channels.iter_mut() {
                if let Some(node) = document.nodes().nth(*node_index) {
                    let rest = Mat4::from_cols_array_2d(&node.transform().matrix());
                    let (scale, rotation, translation) = rest.to_scale_rotation_translation();

                    if channel.position_keys.is_empty() {
                        channel.position_keys.push(Keyframe::new(0.0, translation));
                    }
                    if channel.rotation_keys.is_empty() {
                        channel.rotation_keys.push(Keyframe::new(0.0, rotation));
                    }
                    if channel.scale_keys.is_empty() {
                        channel.scale_keys.push(Keyframe::new(0.0, scale));
                    }
                }

                pad_track_to_duration(&mut channel.position_keys, duration);
                pad_track_to_duration(&mut channel.rotation_keys, duration);
                pad_track_to_duration(&mut channel.scale_keys, duration);
            }

            AnimationData {
                name,
                duration_ticks: duration,
                // glTF 时间轴以秒计
                ticks_per_second: 1.0,
                channels: channels.into_values().collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{PoseEvaluator, DEFAULT_TICKS_PER_SECOND};
    use crate::skeleton::Skeleton;

    #[test]
    fn test_pad_short_track_adds_boundary_keys() {
        // 轨道只覆盖 [2, 5]，动画时长 10
        let mut keys = vec![
            Keyframe::new(2.0, Vec3::ZERO),
            Keyframe::new(5.0, Vec3::new(5.0, 0.0, 0.0)),
        ];
        pad_track_to_duration(&mut keys, 10.0);

        assert_eq!(keys.len(), 4);
        assert_eq!(keys[0].time, 0.0);
        assert_eq!(keys[0].value, Vec3::ZERO);
        assert_eq!(keys[3].time, 10.0);
        assert_eq!(keys[3].value, Vec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_pad_full_range_track_unchanged() {
        let mut keys = vec![
            Keyframe::new(0.0, Vec3::ZERO),
            Keyframe::new(10.0, Vec3::ONE),
        ];
        pad_track_to_duration(&mut keys, 10.0);
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn test_padded_short_track_samples_past_its_end() {
        // 位置轨道在第 5 刻度就结束，动画却长 10 刻度；补齐后
        // 轨道末尾之后的采样保持末关键帧的值而不是报错
        let mut root = SceneNode::new("root", Mat4::IDENTITY);
        root.children.push(1);
        let bone = SceneNode::new("bone", Mat4::IDENTITY);

        let mut skeleton = Skeleton::new();
        skeleton.assign_bone_index("bone", Mat4::IDENTITY);

        let mut channel = NodeChannel::new("bone");
        channel.position_keys = vec![
            Keyframe::new(0.0, Vec3::ZERO),
            Keyframe::new(5.0, Vec3::new(5.0, 0.0, 0.0)),
        ];
        channel.rotation_keys = vec![Keyframe::new(0.0, Quat::IDENTITY)];
        channel.scale_keys = vec![Keyframe::new(0.0, Vec3::ONE)];

        let duration = 10.0;
        pad_track_to_duration(&mut channel.position_keys, duration);
        pad_track_to_duration(&mut channel.rotation_keys, duration);
        pad_track_to_duration(&mut channel.scale_keys, duration);

        let animation = AnimationData {
            name: "partial".to_string(),
            duration_ticks: duration,
            ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            channels: vec![channel],
        };

        let evaluator = PoseEvaluator::new(
            vec![root, bone],
            0,
            skeleton,
            Some(animation),
            Mat4::IDENTITY,
            DEFAULT_TICKS_PER_SECOND,
        );

        // 7 刻度 = 0.28 秒，落在原始轨道范围之外
        let pose = evaluator.bone_transforms(7.0 / DEFAULT_TICKS_PER_SECOND).unwrap();
        let expected = Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0));
        assert!((pose[0] - expected).abs_diff_eq(Mat4::ZERO, 1e-5));
    }
}
