//! 导入场景数据模型
//!
//! 资源导入器（外部协作者）产出的通用场景快照：节点层级、骨骼定义、
//! 顶点权重与动画通道。管线只读这份数据，不持有导入库的内部表示。

use glam::{Mat4, Quat, Vec3};

// ============================================================================
// 节点层级
// ============================================================================

/// 场景层级节点
///
/// 节点以索引数组（arena）形式存放，子节点通过索引引用，
/// 加载后保持只读。节点不一定是骨骼。
#[derive(Clone, Debug)]
pub struct SceneNode {
    /// 节点名称（动画通道与骨骼按名称匹配）
    pub name: String,
    /// 静态局部变换（无动画通道命中时使用）
    pub rest_transform: Mat4,
    /// 子节点索引列表
    pub children: Vec<usize>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, rest_transform: Mat4) -> Self {
        Self {
            name: name.into(),
            rest_transform,
            children: Vec::new(),
        }
    }
}

// ============================================================================
// 骨骼与顶点权重
// ============================================================================

/// 单个顶点权重（骨骼 -> 顶点）
#[derive(Clone, Copy, Debug)]
pub struct BoneWeight {
    /// 网格内的顶点索引
    pub vertex: u32,
    /// 权重值
    pub weight: f32,
}

/// 导入的骨骼定义
#[derive(Clone, Debug)]
pub struct BoneData {
    /// 骨骼名称（与层级节点名称对应）
    pub name: String,
    /// 偏移矩阵（绑定姿态空间 -> 骨骼局部空间）
    pub offset_matrix: Mat4,
    /// 该骨骼影响的顶点权重列表
    pub weights: Vec<BoneWeight>,
}

/// 单个网格的骨骼绑定信息
///
/// 多网格角色的顶点统一编号：全局顶点索引 = `base_vertex` + 网格内索引。
#[derive(Clone, Debug)]
pub struct MeshBones {
    /// 该网格在全局顶点缓冲中的起始顶点
    pub base_vertex: u32,
    /// 顶点数量
    pub vertex_count: u32,
    /// 骨骼列表
    pub bones: Vec<BoneData>,
}

// ============================================================================
// 动画通道
// ============================================================================

/// 关键帧
#[derive(Clone, Copy, Debug)]
pub struct Keyframe<T> {
    /// 时间（刻度，非秒）
    pub time: f32,
    /// 值
    pub value: T,
}

impl<T> Keyframe<T> {
    pub fn new(time: f32, value: T) -> Self {
        Self { time, value }
    }
}

/// 单个节点的动画通道
///
/// 三条独立的关键帧序列，按时间升序排列，每条至少一个关键帧。
/// 只有一个关键帧的序列是常量，不做插值。
#[derive(Clone, Debug)]
pub struct NodeChannel {
    /// 目标节点名称
    pub node_name: String,
    /// 位置关键帧
    pub position_keys: Vec<Keyframe<Vec3>>,
    /// 旋转关键帧（四元数）
    pub rotation_keys: Vec<Keyframe<Quat>>,
    /// 缩放关键帧
    pub scale_keys: Vec<Keyframe<Vec3>>,
}

impl NodeChannel {
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
            position_keys: Vec::new(),
            rotation_keys: Vec::new(),
            scale_keys: Vec::new(),
        }
    }
}

/// 一段导入的动画
#[derive(Clone, Debug)]
pub struct AnimationData {
    /// 动画名称
    pub name: String,
    /// 总时长（刻度）
    pub duration_ticks: f32,
    /// 每秒刻度数（0 表示未声明，评估时回退到默认值）
    pub ticks_per_second: f32,
    /// 按节点划分的动画通道
    pub channels: Vec<NodeChannel>,
}

// ============================================================================
// 导入场景
// ============================================================================

/// 导入器产出的完整场景快照
#[derive(Clone, Debug, Default)]
pub struct ImportedScene {
    /// 节点 arena，`root` 为根节点索引
    pub nodes: Vec<SceneNode>,
    /// 根节点索引
    pub root: usize,
    /// 各网格的骨骼绑定
    pub meshes: Vec<MeshBones>,
    /// 动画列表（取第一段驱动角色；可为空，角色保持静止姿态）
    pub animations: Vec<AnimationData>,
}

impl ImportedScene {
    /// 全局顶点总数
    pub fn total_vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.vertex_count as usize).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_vertex_count() {
        let scene = ImportedScene {
            nodes: vec![SceneNode::new("root", Mat4::IDENTITY)],
            root: 0,
            meshes: vec![
                MeshBones {
                    base_vertex: 0,
                    vertex_count: 12,
                    bones: Vec::new(),
                },
                MeshBones {
                    base_vertex: 12,
                    vertex_count: 8,
                    bones: Vec::new(),
                },
            ],
            animations: Vec::new(),
        };

        assert_eq!(scene.total_vertex_count(), 20);
    }
}
