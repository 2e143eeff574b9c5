//! 角色加载管线
//!
//! 加载期一次性把导入场景装配成可渲染角色：建骨骼表、分发顶点权重、
//! 校验动画通道不变量，并构建每帧使用的姿态评估器。

use glam::Mat4;

use crate::binding::{PackedVertexBones, VertexBoneBinder};
use crate::config::AnimationConfig;
use crate::error::{AnimationError, AnimationResult};
use crate::pose::PoseEvaluator;
use crate::scene::ImportedScene;
use crate::skeleton::Skeleton;

/// 加载完成的动画角色
///
/// 持有静态的逐顶点骨骼编码和姿态评估器。逐顶点缓冲在加载时
/// 固定，姿态每帧通过 [`AnimatedCharacter::bone_transforms`] 重算。
pub struct AnimatedCharacter {
    evaluator: PoseEvaluator,
    vertex_bones: Vec<PackedVertexBones>,
}

impl AnimatedCharacter {
    /// 从导入场景装配角色
    ///
    /// 阻塞完成全部加载工作；返回错误时角色不可用（不会从
    /// 残缺场景继续装配）。
    pub fn from_scene(scene: ImportedScene, config: &AnimationConfig) -> AnimationResult<Self> {
        if scene.nodes.is_empty() {
            return Err(AnimationError::EmptyScene);
        }

        // 帧时遍历不做越界检查，子节点索引必须在加载期校验
        for (index, node) in scene.nodes.iter().enumerate() {
            for &child in &node.children {
                if child >= scene.nodes.len() {
                    return Err(AnimationError::InvalidHierarchy { node: index, child });
                }
            }
        }

        let root_node = scene
            .nodes
            .get(scene.root)
            .ok_or(AnimationError::InvalidHierarchy {
                node: scene.root,
                child: scene.root,
            })?;

        // 帧时遍历按树递归，根可达集内的重复访问（环、共享子节点）
        // 会造成无界递归，同样必须在加载期拒绝
        let mut visited = vec![false; scene.nodes.len()];
        let mut stack = vec![scene.root];
        while let Some(index) = stack.pop() {
            if visited[index] {
                return Err(AnimationError::CyclicHierarchy { node: index });
            }
            visited[index] = true;
            stack.extend_from_slice(&scene.nodes[index].children);
        }

        // 全局逆根变换：抵消资源里烘焙的全局偏移
        let global_inverse = root_node.rest_transform.inverse();

        let mut skeleton = Skeleton::new();
        let mut binder =
            VertexBoneBinder::new(scene.total_vertex_count(), config.overflow_policy);

        for mesh in &scene.meshes {
            for bone in &mesh.bones {
                let bone_index = skeleton.assign_bone_index(&bone.name, bone.offset_matrix);
                for weight in &bone.weights {
                    let global_vertex = mesh.base_vertex as usize + weight.vertex as usize;
                    binder.add_influence(global_vertex, bone_index as u32, weight.weight)?;
                }
            }
        }

        if skeleton.bone_count() > config.max_bones {
            return Err(AnimationError::TooManyBones {
                count: skeleton.bone_count(),
                max: config.max_bones,
            });
        }

        let animation = scene.animations.into_iter().next();
        if let Some(animation) = &animation {
            Self::validate_channels(animation)?;
        }

        log::info!(
            "loaded character: {} bones, {} vertices, animation: {}",
            skeleton.bone_count(),
            binder.vertex_count(),
            animation
                .as_ref()
                .map(|a| a.name.as_str())
                .unwrap_or("<none>")
        );

        let vertex_bones = binder.packed_buffer();
        let evaluator = PoseEvaluator::new(
            scene.nodes,
            scene.root,
            skeleton,
            animation,
            global_inverse,
            config.default_ticks_per_second,
        );

        Ok(Self {
            evaluator,
            vertex_bones,
        })
    }

    /// 每条通道的三条关键帧序列都必须非空
    fn validate_channels(animation: &crate::scene::AnimationData) -> AnimationResult<()> {
        for channel in &animation.channels {
            let tracks: [(&'static str, usize); 3] = [
                ("position", channel.position_keys.len()),
                ("rotation", channel.rotation_keys.len()),
                ("scale", channel.scale_keys.len()),
            ];
            for (name, len) in tracks {
                if len == 0 {
                    return Err(AnimationError::EmptyTrack {
                        node: channel.node_name.clone(),
                        channel: name,
                    });
                }
            }
        }
        Ok(())
    }

    /// 计算当前时刻的骨骼矩阵数组（每帧调用）
    pub fn bone_transforms(&self, elapsed_seconds: f32) -> AnimationResult<Vec<Mat4>> {
        self.evaluator.bone_transforms(elapsed_seconds)
    }

    /// 骨骼表
    pub fn skeleton(&self) -> &Skeleton {
        self.evaluator.skeleton()
    }

    /// 渲染端的逐顶点骨骼属性缓冲
    pub fn vertex_bones(&self) -> &[PackedVertexBones] {
        &self.vertex_bones
    }
}
