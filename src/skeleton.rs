//! 骨骼表
//!
//! 维护骨骼名称到稠密索引的映射和并行的骨骼信息表。
//! 每个加载的角色拥有自己的骨骼表，不跨实例共享。

use glam::Mat4;
use std::collections::HashMap;

/// 单个骨骼的加载期信息
#[derive(Clone, Debug)]
pub struct BoneInfo {
    /// 偏移矩阵（绑定姿态空间 -> 骨骼局部空间），首次分配后不变
    pub offset_matrix: Mat4,
}

/// 骨骼表
///
/// 名称首次出现时分配下一个顺序索引（0, 1, 2, ...），
/// 名称与索引的对应关系在角色生命周期内不变。
#[derive(Clone, Debug, Default)]
pub struct Skeleton {
    bone_name_to_index: HashMap<String, usize>,
    bones: Vec<BoneInfo>,
}

impl Skeleton {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取或分配骨骼索引
    ///
    /// 首次遇到的名称记录偏移矩阵并分配新索引；重复调用返回已有索引，
    /// 不触碰已记录的偏移矩阵（每个角色一张表，同名骨骼即同一骨骼）。
    pub fn assign_bone_index(&mut self, name: &str, offset_matrix: Mat4) -> usize {
        if let Some(&index) = self.bone_name_to_index.get(name) {
            return index;
        }

        let index = self.bones.len();
        self.bone_name_to_index.insert(name.to_string(), index);
        self.bones.push(BoneInfo { offset_matrix });
        index
    }

    /// 通过名称查找骨骼索引
    pub fn get_bone_index(&self, name: &str) -> Option<usize> {
        self.bone_name_to_index.get(name).copied()
    }

    /// 骨骼数量
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// 指定骨骼的偏移矩阵
    pub fn offset_matrix(&self, index: usize) -> Option<Mat4> {
        self.bones.get(index).map(|b| b.offset_matrix)
    }
}
