use bevy::prelude::*;

/// 玩家标记组件
#[derive(Component)]
pub struct Player;

/// 本机操控的玩家（背包 / 快捷栏 / 手都挂在它上面）
#[derive(Component, Debug, Default)]
pub struct LocalPlayer;

/// 手部挂点
#[derive(Component, Debug, Default)]
pub struct HandAnchor;

/// 视角：yaw 转身体，pitch 转眼睛（弧度）
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Look {
    pub yaw: f32,
    pub pitch: f32,
}

impl Look {
    pub fn body_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    pub fn eye_rotation(&self) -> Quat {
        Quat::from_rotation_x(self.pitch)
    }
}

pub const EYE_HEIGHT: f32 = 1.6;
/// 手部挂点相对眼睛的位置（右下前方）
pub const HAND_OFFSET: Vec3 = Vec3::new(0.3, -0.3, -0.5);
