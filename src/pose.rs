//! 姿态评估
//!
//! 每帧对节点层级做一次自顶向下的深度优先遍历：有动画通道命中的节点
//! 用采样出的 TRS 组合局部变换，否则用静态变换；全局变换沿父链
//! 相乘传下，骨骼节点落下最终蒙皮矩阵。

use glam::Mat4;
use std::collections::HashMap;

use crate::error::AnimationResult;
use crate::sampler::AnimationSampler;
use crate::scene::{AnimationData, NodeChannel, SceneNode};
use crate::skeleton::Skeleton;

/// 渲染端骨骼矩阵统一数组的上限
pub const MAX_BONES: usize = 100;

/// 资源未声明每秒刻度数时的默认值
pub const DEFAULT_TICKS_PER_SECOND: f32 = 25.0;

/// 姿态评估器
///
/// 持有加载期构建的只读数据：节点 arena、骨骼表、按节点名索引的
/// 动画通道和全局逆根变换。跨帧无可变状态，任意时间序列
/// （递增、回退）都可以安全查询。
pub struct PoseEvaluator {
    nodes: Vec<SceneNode>,
    root: usize,
    skeleton: Skeleton,
    /// 节点名 -> 动画通道
    channels: HashMap<String, NodeChannel>,
    /// 动画时长（刻度）与每秒刻度数；无动画时为 None
    timing: Option<(f32, f32)>,
    global_inverse: Mat4,
}

impl PoseEvaluator {
    /// 从加载期数据构建评估器
    ///
    /// `global_inverse` 是导入根节点变换的逆，用来抵消资源里
    /// 烘焙的全局偏移。动画声明的每秒刻度数为 0 时退回
    /// `default_ticks_per_second`（通常取自配置，或
    /// [`DEFAULT_TICKS_PER_SECOND`]）。
    pub fn new(
        nodes: Vec<SceneNode>,
        root: usize,
        skeleton: Skeleton,
        animation: Option<AnimationData>,
        global_inverse: Mat4,
        default_ticks_per_second: f32,
    ) -> Self {
        let (timing, channels) = match animation {
            Some(animation) => {
                let ticks_per_second = if animation.ticks_per_second != 0.0 {
                    animation.ticks_per_second
                } else {
                    log::warn!(
                        "animation '{}' declares no ticks per second, defaulting to {}",
                        animation.name,
                        default_ticks_per_second
                    );
                    default_ticks_per_second
                };
                let channels = animation
                    .channels
                    .into_iter()
                    .map(|c| (c.node_name.clone(), c))
                    .collect();
                (Some((animation.duration_ticks, ticks_per_second)), channels)
            }
            None => (None, HashMap::new()),
        };

        Self {
            nodes,
            root,
            skeleton,
            channels,
            timing,
            global_inverse,
        }
    }

    /// 骨骼表
    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// 计算全部骨骼的最终变换
    ///
    /// 每帧调用一次，整体重算并返回按骨骼索引对齐的矩阵数组。
    /// 时间轴末尾取模回绕（不钳制），动画无缝循环。
    pub fn bone_transforms(&self, elapsed_seconds: f32) -> AnimationResult<Vec<Mat4>> {
        let time_ticks = self.wrap_time(elapsed_seconds);

        let mut pose = vec![Mat4::IDENTITY; self.skeleton.bone_count()];
        if !self.nodes.is_empty() {
            self.visit_node(self.root, Mat4::IDENTITY, time_ticks, &mut pose)?;
        }
        Ok(pose)
    }

    /// 墙钟秒 -> 回绕后的动画刻度
    ///
    /// 欧几里得取余保证回退（负）时间同样落在 `[0, duration)`。
    fn wrap_time(&self, elapsed_seconds: f32) -> f32 {
        match self.timing {
            Some((duration_ticks, ticks_per_second)) if duration_ticks > 0.0 => {
                (elapsed_seconds * ticks_per_second).rem_euclid(duration_ticks)
            }
            _ => 0.0,
        }
    }

    fn visit_node(
        &self,
        index: usize,
        parent_transform: Mat4,
        time_ticks: f32,
        pose: &mut [Mat4],
    ) -> AnimationResult<()> {
        let node = &self.nodes[index];

        let local_transform = match self.channels.get(&node.name) {
            Some(channel) => {
                let position = AnimationSampler::sample_position(channel, time_ticks)?;
                let rotation = AnimationSampler::sample_rotation(channel, time_ticks)?;
                let scale = AnimationSampler::sample_scale(channel, time_ticks)?;
                Mat4::from_scale_rotation_translation(scale, rotation, position)
            }
            None => node.rest_transform,
        };

        let global_transform = parent_transform * local_transform;

        if let Some(bone_index) = self.skeleton.get_bone_index(&node.name) {
            if let Some(offset_matrix) = self.skeleton.offset_matrix(bone_index) {
                pose[bone_index] = self.global_inverse * global_transform * offset_matrix;
            }
        }

        for &child in &node.children {
            self.visit_node(child, global_transform, time_ticks, pose)?;
        }
        Ok(())
    }
}
