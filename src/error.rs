//! 动画管线错误类型
//!
//! 加载期错误（导入失败、顶点权重溢出、骨骼数量超限）与
//! 帧时数据完整性错误（插值因子越界）统一定义在这里。

use thiserror::Error;

/// 动画管线错误
#[derive(Error, Debug)]
pub enum AnimationError {
    /// 导入器解析场景失败
    #[error("failed to import scene from '{path}': {message}")]
    ImportFailed { path: String, message: String },

    /// 场景没有任何层级节点
    #[error("imported scene has no hierarchy nodes")]
    EmptyScene,

    /// 层级节点引用了不存在的子节点
    #[error("hierarchy node {node} references child {child}, which does not exist")]
    InvalidHierarchy { node: usize, child: usize },

    /// 节点从根出发可被多次到达（环或共享子节点）
    #[error("hierarchy node {node} is reachable more than once from the root")]
    CyclicHierarchy { node: usize },

    /// 单个顶点的骨骼影响数超过容量上限
    #[error("vertex {vertex} exceeds the maximum of {max} bone influences")]
    InfluenceOverflow { vertex: usize, max: usize },

    /// 导入器引用了超出网格范围的顶点
    #[error("importer referenced vertex {vertex}, but the mesh only has {count} vertices")]
    VertexOutOfRange { vertex: usize, count: usize },

    /// 骨骼数量超过渲染端支持的上限
    #[error("skeleton has {count} bones, exceeding the supported maximum of {max}")]
    TooManyBones { count: usize, max: usize },

    /// 动画通道的关键帧序列为空
    #[error("animation channel '{channel}' for node '{node}' has no keyframes")]
    EmptyTrack { node: String, channel: &'static str },

    /// 插值因子越界，关键帧时间数据损坏
    #[error(
        "interpolation factor {factor} out of [0, 1] in channel '{channel}' for node '{node}' at time {time} ticks"
    )]
    OutOfRangeFactor {
        node: String,
        channel: &'static str,
        factor: f32,
        time: f32,
    },
}

pub type AnimationResult<T> = Result<T, AnimationError>;
