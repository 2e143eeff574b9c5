//! 顶点骨骼绑定
//!
//! 每个顶点持有固定容量的 (骨骼索引, 权重) 影响列表。固定容量保证
//! 发往渲染端的逐顶点属性是定宽记录，而不是变长列表。

use crate::error::{AnimationError, AnimationResult};

/// 单个顶点的最大骨骼影响数
pub const MAX_BONE_INFLUENCES: usize = 10;

// ============================================================================
// 溢出策略
// ============================================================================

/// 顶点影响槽位耗尽时的处理策略
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// 加载失败，报告越界顶点（默认）
    #[default]
    Fail,
    /// 按权重截断：保留权重最大的前 N 个影响
    KeepStrongest,
}

// ============================================================================
// 顶点影响槽位
// ============================================================================

/// 单个顶点的骨骼影响数据
///
/// 权重为 0 的槽位视为空位，新影响写入从左到右第一个空位。
#[derive(Clone, Copy, Debug)]
pub struct VertexBoneData {
    bone_ids: [u32; MAX_BONE_INFLUENCES],
    weights: [f32; MAX_BONE_INFLUENCES],
}

impl Default for VertexBoneData {
    fn default() -> Self {
        Self {
            bone_ids: [0; MAX_BONE_INFLUENCES],
            weights: [0.0; MAX_BONE_INFLUENCES],
        }
    }
}

impl VertexBoneData {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入一个影响，所有槽位已占用时返回 `None` 表示溢出
    fn push(&mut self, bone_id: u32, weight: f32) -> Option<()> {
        for i in 0..MAX_BONE_INFLUENCES {
            if self.weights[i] == 0.0 {
                self.bone_ids[i] = bone_id;
                self.weights[i] = weight;
                return Some(());
            }
        }
        None
    }

    /// 权重最小的槽位
    fn weakest_slot(&self) -> usize {
        let mut slot = 0;
        for i in 1..MAX_BONE_INFLUENCES {
            if self.weights[i] < self.weights[slot] {
                slot = i;
            }
        }
        slot
    }

    /// 非零权重的影响数量
    pub fn influence_count(&self) -> usize {
        self.weights.iter().filter(|w| **w != 0.0).count()
    }

    /// 遍历非零影响
    pub fn influences(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        self.bone_ids
            .iter()
            .zip(self.weights.iter())
            .filter(|(_, w)| **w != 0.0)
            .map(|(id, w)| (*id, *w))
    }

    /// 归一化权重（权重和接近 0 时不处理）
    pub fn normalize_weights(&mut self) {
        let sum: f32 = self.weights.iter().sum();
        if sum > 0.0001 {
            let inv_sum = 1.0 / sum;
            for w in &mut self.weights {
                *w *= inv_sum;
            }
        }
    }

    /// 转换为渲染端的定宽记录
    pub fn packed(&self) -> PackedVertexBones {
        let mut ids = [0.0f32; MAX_BONE_INFLUENCES];
        for (slot, id) in ids.iter_mut().zip(self.bone_ids.iter()) {
            *slot = *id as f32;
        }
        PackedVertexBones {
            bone_ids: ids,
            weights: self.weights,
        }
    }
}

// ============================================================================
// 渲染端定宽记录
// ============================================================================

/// 发往渲染端的逐顶点骨骼属性记录
///
/// 序列化约定：骨骼索引与权重各占 10 个 float，在顶点属性边界上
/// 按 vec4 + vec4 + vec2 拆分为三个属性槽（索引三槽、权重三槽）。
/// 索引以 float 存储，着色器内取整后检索骨骼矩阵数组。
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PackedVertexBones {
    /// 骨骼索引（float 编码）
    pub bone_ids: [f32; MAX_BONE_INFLUENCES],
    /// 骨骼权重
    pub weights: [f32; MAX_BONE_INFLUENCES],
}

// ============================================================================
// 顶点绑定器
// ============================================================================

/// 把导入器按骨骼流入的权重分发到各顶点的影响槽位
#[derive(Clone, Debug)]
pub struct VertexBoneBinder {
    vertices: Vec<VertexBoneData>,
    policy: OverflowPolicy,
}

impl VertexBoneBinder {
    /// 为 `vertex_count` 个顶点创建绑定器
    pub fn new(vertex_count: usize, policy: OverflowPolicy) -> Self {
        Self {
            vertices: vec![VertexBoneData::default(); vertex_count],
            policy,
        }
    }

    /// 记录一个骨骼对顶点的影响
    ///
    /// 溢出时的行为由策略决定：`Fail` 返回 [`AnimationError::InfluenceOverflow`]，
    /// `KeepStrongest` 用新权重替换最小权重（若更大），否则丢弃并记录日志。
    pub fn add_influence(
        &mut self,
        vertex: usize,
        bone_id: u32,
        weight: f32,
    ) -> AnimationResult<()> {
        let count = self.vertices.len();
        let data = self
            .vertices
            .get_mut(vertex)
            .ok_or(AnimationError::VertexOutOfRange { vertex, count })?;

        if data.push(bone_id, weight).is_some() {
            return Ok(());
        }

        match self.policy {
            OverflowPolicy::Fail => Err(AnimationError::InfluenceOverflow {
                vertex,
                max: MAX_BONE_INFLUENCES,
            }),
            OverflowPolicy::KeepStrongest => {
                let slot = data.weakest_slot();
                if weight > data.weights[slot] {
                    log::warn!(
                        "vertex {} influence overflow: replacing bone {} (weight {}) with bone {} (weight {})",
                        vertex,
                        data.bone_ids[slot],
                        data.weights[slot],
                        bone_id,
                        weight
                    );
                    data.bone_ids[slot] = bone_id;
                    data.weights[slot] = weight;
                } else {
                    log::warn!(
                        "vertex {} influence overflow: dropping bone {} (weight {})",
                        vertex,
                        bone_id,
                        weight
                    );
                }
                Ok(())
            }
        }
    }

    /// 顶点数量
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// 单个顶点的影响数据
    pub fn vertex(&self, index: usize) -> Option<&VertexBoneData> {
        self.vertices.get(index)
    }

    /// 产出渲染端的完整逐顶点记录缓冲
    pub fn packed_buffer(&self) -> Vec<PackedVertexBones> {
        self.vertices.iter().map(|v| v.packed()).collect()
    }
}
