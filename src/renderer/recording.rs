// Headless backend that remembers every call it receives.
// Tests assert on the event log; tools can diff it between frames.

use std::collections::HashMap;

use glam::IVec2;

use crate::renderer::{DrawCall, DrawPool, PoolType, ShaderId, ShaderUniforms, TextureId};
use crate::world::Rect;

/// One call received by a [`RecordingPool`].
#[derive(Clone, Debug, PartialEq)]
pub enum PoolEvent {
    Use { pool: PoolType, dest: Rect, src: Rect },
    Opacity(f32),
    ResetOpacity,
    BindShader(ShaderId, ShaderUniforms),
    ResetShader,
    Draw(DrawCall),
    Flush,
    Resize { pool: PoolType, size: IVec2 },
    Smooth { pool: PoolType, smooth: bool },
    Enabled { pool: PoolType, enabled: bool },
}

pub struct RecordingPool {
    pub events: Vec<PoolEvent>,
    pub max_texture_size: i32,
    pub shaders: bool,
    pub default_shader: Option<ShaderId>,
    textures: HashMap<String, TextureId>,
}

impl Default for RecordingPool {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            max_texture_size: 4096,
            shaders: true,
            default_shader: None,
            textures: HashMap::new(),
        }
    }
}

impl RecordingPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `path` resolvable through [`DrawPool::texture`].
    pub fn register_texture<S: Into<String>>(&mut self, path: S) -> TextureId {
        let id = self.textures.len() as TextureId + 1;
        *self.textures.entry(path.into()).or_insert(id)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Draw calls only, in submission order.
    pub fn draws(&self) -> impl Iterator<Item = &DrawCall> {
        self.events.iter().filter_map(|e| match e {
            PoolEvent::Draw(call) => Some(call),
            _ => None,
        })
    }

    /// Events recorded after the last `use_pool(pool, ..)` and up to the
    /// next pool switch.
    pub fn pool_events(&self, pool: PoolType) -> &[PoolEvent] {
        let Some(start) = self
            .events
            .iter()
            .rposition(|e| matches!(e, PoolEvent::Use { pool: p, .. } if *p == pool))
        else {
            return &[];
        };
        let rest = &self.events[start + 1..];
        let end = rest
            .iter()
            .position(|e| matches!(e, PoolEvent::Use { .. }))
            .unwrap_or(rest.len());
        &rest[..end]
    }
}

impl DrawPool for RecordingPool {
    fn use_pool(&mut self, pool: PoolType, dest: Rect, src: Rect) {
        self.events.push(PoolEvent::Use { pool, dest, src });
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.events.push(PoolEvent::Opacity(opacity));
    }

    fn reset_opacity(&mut self) {
        self.events.push(PoolEvent::ResetOpacity);
    }

    fn bind_shader(&mut self, shader: ShaderId, uniforms: &ShaderUniforms) {
        self.events.push(PoolEvent::BindShader(shader, *uniforms));
    }

    fn reset_shader(&mut self) {
        self.events.push(PoolEvent::ResetShader);
    }

    fn draw(&mut self, call: DrawCall) {
        self.events.push(PoolEvent::Draw(call));
    }

    fn flush(&mut self) {
        self.events.push(PoolEvent::Flush);
    }

    fn resize(&mut self, pool: PoolType, size: IVec2) {
        self.events.push(PoolEvent::Resize { pool, size });
    }

    fn set_smooth(&mut self, pool: PoolType, smooth: bool) {
        self.events.push(PoolEvent::Smooth { pool, smooth });
    }

    fn set_enabled(&mut self, pool: PoolType, enabled: bool) {
        self.events.push(PoolEvent::Enabled { pool, enabled });
    }

    fn max_texture_size(&self) -> i32 {
        self.max_texture_size
    }

    fn has_shaders(&self) -> bool {
        self.shaders
    }

    fn texture(&mut self, path: &str) -> Option<TextureId> {
        self.textures.get(path).copied()
    }

    fn default_map_shader(&self) -> Option<ShaderId> {
        self.default_shader
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_events_slices_the_last_pool_use() {
        let mut pool = RecordingPool::new();
        pool.use_pool(PoolType::Map, Rect::default(), Rect::default());
        pool.set_opacity(0.5);
        pool.flush();
        pool.use_pool(PoolType::Text, Rect::default(), Rect::default());
        pool.flush();

        assert_eq!(
            pool.pool_events(PoolType::Map),
            &[PoolEvent::Opacity(0.5), PoolEvent::Flush]
        );
        assert_eq!(pool.pool_events(PoolType::Text), &[PoolEvent::Flush]);
        assert!(pool.pool_events(PoolType::Light).is_empty());
    }

    #[test]
    fn textures_resolve_once_registered() {
        let mut pool = RecordingPool::new();
        assert_eq!(pool.texture("crosshair.png"), None);
        let id = pool.register_texture("crosshair.png");
        assert_eq!(pool.texture("crosshair.png"), Some(id));
        assert_eq!(pool.register_texture("crosshair.png"), id);
    }
}
