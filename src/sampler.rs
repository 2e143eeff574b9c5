//! 动画采样服务
//!
//! 遵循贫血模型，通道数据（[`NodeChannel`]）与采样逻辑分离。
//! 三条轨道共用同一套包围搜索与因子计算：位置/缩放走线性插值，
//! 旋转走球面线性插值。

use glam::{Quat, Vec3};

use crate::error::{AnimationError, AnimationResult};
use crate::scene::{Keyframe, NodeChannel};

/// 动画采样器 - 封装关键帧插值逻辑
pub struct AnimationSampler;

impl AnimationSampler {
    /// 采样指定时间（刻度）的位置
    pub fn sample_position(channel: &NodeChannel, time_ticks: f32) -> AnimationResult<Vec3> {
        Self::sample_vec3(&channel.position_keys, time_ticks, &channel.node_name, "position")
    }

    /// 采样指定时间（刻度）的旋转
    pub fn sample_rotation(channel: &NodeChannel, time_ticks: f32) -> AnimationResult<Quat> {
        let keys = &channel.rotation_keys;
        let first = keys.first().ok_or_else(|| AnimationError::EmptyTrack {
            node: channel.node_name.clone(),
            channel: "rotation",
        })?;

        // 单关键帧即常量
        if keys.len() == 1 {
            return Ok(first.value);
        }

        let i = Self::find_bracket(keys, time_ticks);
        let (k0, k1) = (&keys[i], &keys[i + 1]);
        let factor =
            Self::interpolation_factor(k0.time, k1.time, time_ticks, &channel.node_name, "rotation")?;
        Ok(k0.value.slerp(k1.value, factor))
    }

    /// 采样指定时间（刻度）的缩放
    pub fn sample_scale(channel: &NodeChannel, time_ticks: f32) -> AnimationResult<Vec3> {
        Self::sample_vec3(&channel.scale_keys, time_ticks, &channel.node_name, "scale")
    }

    fn sample_vec3(
        keys: &[Keyframe<Vec3>],
        time_ticks: f32,
        node: &str,
        channel: &'static str,
    ) -> AnimationResult<Vec3> {
        let first = keys.first().ok_or_else(|| AnimationError::EmptyTrack {
            node: node.to_string(),
            channel,
        })?;

        // 单关键帧即常量
        if keys.len() == 1 {
            return Ok(first.value);
        }

        let i = Self::find_bracket(keys, time_ticks);
        let (k0, k1) = (&keys[i], &keys[i + 1]);
        let factor = Self::interpolation_factor(k0.time, k1.time, time_ticks, node, channel)?;
        Ok(k0.value.lerp(k1.value, factor))
    }

    /// 包围搜索：返回 i 使得 `keys[i].time <= t < keys[i+1].time`
    ///
    /// 升序线性扫描（关键帧数量是几十级别）；时间在首个区间之前
    /// 或序列只有一个关键帧时返回 0。
    fn find_bracket<T>(keys: &[Keyframe<T>], time_ticks: f32) -> usize {
        for i in 0..keys.len().saturating_sub(1) {
            if time_ticks < keys[i + 1].time {
                return i;
            }
        }
        0
    }

    /// 插值因子 `(t - t0) / (t1 - t0)`，必须落在 [0, 1]
    ///
    /// 越界说明关键帧时间数据损坏，直接上报而不是静默钳制，
    /// 保留损坏数据的可观测性。
    fn interpolation_factor(
        t0: f32,
        t1: f32,
        time_ticks: f32,
        node: &str,
        channel: &'static str,
    ) -> AnimationResult<f32> {
        let factor = (time_ticks - t0) / (t1 - t0);
        if !(0.0..=1.0).contains(&factor) {
            log::error!(
                "interpolation factor {} out of range in '{}' channel for node '{}': t0 {} t1 {} time {}",
                factor,
                channel,
                node,
                t0,
                t1,
                time_ticks
            );
            return Err(AnimationError::OutOfRangeFactor {
                node: node.to_string(),
                channel,
                factor,
                time: time_ticks,
            });
        }
        Ok(factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vec3_channel(keys: &[(f32, Vec3)]) -> NodeChannel {
        let mut channel = NodeChannel::new("test");
        channel.position_keys = keys
            .iter()
            .map(|(t, v)| Keyframe::new(*t, *v))
            .collect();
        channel
    }

    #[test]
    fn test_single_key_is_constant() {
        let channel = vec3_channel(&[(3.0, Vec3::new(1.0, 2.0, 3.0))]);

        // 任意查询时间（含负数与越界）都返回唯一关键帧的值
        for t in [-10.0, 0.0, 3.0, 1000.0] {
            let v = AnimationSampler::sample_position(&channel, t).unwrap();
            assert_eq!(v, Vec3::new(1.0, 2.0, 3.0));
        }
    }

    #[test]
    fn test_two_key_midpoint() {
        let channel = vec3_channel(&[
            (0.0, Vec3::ZERO),
            (10.0, Vec3::new(2.0, 4.0, 6.0)),
        ]);

        let v = AnimationSampler::sample_position(&channel, 5.0).unwrap();
        assert!((v - Vec3::new(1.0, 2.0, 3.0)).length() < 0.001);
    }

    #[test]
    fn test_rotation_midpoint_slerp() {
        let mut channel = NodeChannel::new("test");
        channel.rotation_keys = vec![
            Keyframe::new(0.0, Quat::IDENTITY),
            Keyframe::new(10.0, Quat::from_rotation_z(std::f32::consts::FRAC_PI_2)),
        ];

        let q = AnimationSampler::sample_rotation(&channel, 5.0).unwrap();
        let expected = Quat::from_rotation_z(std::f32::consts::FRAC_PI_4);
        assert!(q.angle_between(expected) < 0.001);
    }

    #[test]
    fn test_bracket_selection() {
        let channel = vec3_channel(&[
            (0.0, Vec3::ZERO),
            (1.0, Vec3::X),
            (2.0, Vec3::new(3.0, 0.0, 0.0)),
        ]);

        // 第二个区间 [1, 2] 内按局部因子插值
        let v = AnimationSampler::sample_position(&channel, 1.5).unwrap();
        assert!((v.x - 2.0).abs() < 0.001);
    }

    #[test]
    fn test_out_of_range_factor_is_reported() {
        let channel = vec3_channel(&[(0.0, Vec3::ZERO), (10.0, Vec3::X)]);

        // 超出最后一个关键帧时间，包围回落到 0 号区间，因子 > 1
        let result = AnimationSampler::sample_position(&channel, 20.0);
        assert!(matches!(
            result,
            Err(AnimationError::OutOfRangeFactor { .. })
        ));
    }

    #[test]
    fn test_empty_track_is_reported() {
        let channel = NodeChannel::new("test");
        let result = AnimationSampler::sample_position(&channel, 0.0);
        assert!(matches!(result, Err(AnimationError::EmptyTrack { .. })));
    }
}
