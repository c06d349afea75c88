use std::fmt;

/// Shape of a uniform value as the shader declares it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UniformKind {
    F32,
    I32,
    U32,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
    /// Anything else (arrays, nested structs, ...). Not settable.
    Other,
}

impl fmt::Display for UniformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UniformKind::F32 => "f32",
            UniformKind::I32 => "i32",
            UniformKind::U32 => "u32",
            UniformKind::Vec2 => "vec2<f32>",
            UniformKind::Vec3 => "vec3<f32>",
            UniformKind::Vec4 => "vec4<f32>",
            UniformKind::Mat4 => "mat4x4<f32>",
            UniformKind::Other => "<unsupported>",
        };
        f.write_str(s)
    }
}

/// Where a named uniform lives: which buffer binding, and where inside it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UniformLocation {
    pub group: u32,
    pub binding: u32,
    /// Byte offset inside the binding's buffer.
    pub offset: u32,
    /// Size in bytes.
    pub size: u32,
    pub kind: UniformKind,
}

/// A value that can be written to a uniform location.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    F32(f32),
    I32(i32),
    U32(u32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    /// Column-major.
    Mat4([[f32; 4]; 4]),
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::F32(_) => UniformKind::F32,
            UniformValue::I32(_) => UniformKind::I32,
            UniformValue::U32(_) => UniformKind::U32,
            UniformValue::Vec2(_) => UniformKind::Vec2,
            UniformValue::Vec3(_) => UniformKind::Vec3,
            UniformValue::Vec4(_) => UniformKind::Vec4,
            UniformValue::Mat4(_) => UniformKind::Mat4,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            UniformValue::F32(v) => bytemuck::bytes_of(v),
            UniformValue::I32(v) => bytemuck::bytes_of(v),
            UniformValue::U32(v) => bytemuck::bytes_of(v),
            UniformValue::Vec2(v) => bytemuck::bytes_of(v),
            UniformValue::Vec3(v) => bytemuck::bytes_of(v),
            UniformValue::Vec4(v) => bytemuck::bytes_of(v),
            UniformValue::Mat4(v) => bytemuck::bytes_of(v),
        }
    }
}

/// One `var<uniform>` resource used by the program.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformBinding {
    pub group: u32,
    pub binding: u32,
    /// Variable name in the shader source.
    pub name: Option<String>,
    /// Size of the declared type in bytes.
    pub size: u32,
    /// Stages whose entry points read the binding.
    pub visibility: wgpu::ShaderStages,
}

/// CPU copy of one uniform buffer.
#[derive(Debug, Clone)]
pub struct UniformBlock {
    pub group: u32,
    pub binding: u32,
    bytes: Vec<u8>,
    dirty: bool,
}

impl UniformBlock {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

/// CPU shadow of every uniform buffer of a program.
///
/// Writes land here; `flush_with` hands changed blocks to the uploader once
/// per frame. Block `i` corresponds to the `i`-th binding passed to `new`.
#[derive(Debug, Clone, Default)]
pub struct UniformStorage {
    blocks: Vec<UniformBlock>,
}

/// Uniform buffer sizes are rounded up to this.
const BLOCK_ALIGN: u32 = 16;

impl UniformStorage {
    pub fn new(bindings: &[UniformBinding]) -> Self {
        let blocks = bindings
            .iter()
            .map(|b| UniformBlock {
                group: b.group,
                binding: b.binding,
                bytes: vec![0; b.size.max(1).next_multiple_of(BLOCK_ALIGN) as usize],
                dirty: false,
            })
            .collect();
        Self { blocks }
    }

    pub fn blocks(&self) -> &[UniformBlock] {
        &self.blocks
    }

    /// Writes `value` at `location`.
    ///
    /// Returns `false` (and leaves storage untouched) when the value's kind
    /// differs from the location's or the location is not part of this storage.
    pub fn write(&mut self, location: &UniformLocation, value: UniformValue) -> bool {
        if value.kind() != location.kind {
            return false;
        }

        let Some(block) = self
            .blocks
            .iter_mut()
            .find(|b| b.group == location.group && b.binding == location.binding)
        else {
            return false;
        };

        let src = value.as_bytes();
        let start = location.offset as usize;
        let end = start + src.len();
        if end > block.bytes.len() {
            return false;
        }

        if block.bytes[start..end] != *src {
            block.bytes[start..end].copy_from_slice(src);
            block.dirty = true;
        }
        true
    }

    /// Calls `upload(index, bytes)` for every changed block and marks it clean.
    pub fn flush_with(&mut self, mut upload: impl FnMut(usize, &[u8])) {
        for (i, block) in self.blocks.iter_mut().enumerate() {
            if block.dirty {
                upload(i, &block.bytes);
                block.dirty = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(group: u32, binding: u32, size: u32) -> UniformBinding {
        UniformBinding {
            group,
            binding,
            name: None,
            size,
            visibility: wgpu::ShaderStages::FRAGMENT,
        }
    }

    fn loc(binding: u32, offset: u32, kind: UniformKind) -> UniformLocation {
        UniformLocation { group: 0, binding, offset, size: 8, kind }
    }

    #[test]
    fn blocks_are_padded_to_sixteen_bytes() {
        let s = UniformStorage::new(&[binding(0, 0, 4), binding(0, 1, 20)]);
        assert_eq!(s.blocks()[0].bytes().len(), 16);
        assert_eq!(s.blocks()[1].bytes().len(), 32);
    }

    #[test]
    fn write_places_bytes_at_offset() {
        let mut s = UniformStorage::new(&[binding(0, 0, 16)]);
        assert!(s.write(&loc(0, 8, UniformKind::Vec2), UniformValue::Vec2([1.0, 2.0])));

        let b = &s.blocks()[0];
        assert!(b.is_dirty());
        let floats: &[f32] = bytemuck::cast_slice(b.bytes());
        assert_eq!(floats, &[0.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let mut s = UniformStorage::new(&[binding(0, 0, 16)]);
        assert!(!s.write(&loc(0, 0, UniformKind::Vec2), UniformValue::F32(1.0)));
        assert!(!s.blocks()[0].is_dirty());
    }

    #[test]
    fn unknown_binding_is_rejected() {
        let mut s = UniformStorage::new(&[binding(0, 0, 16)]);
        assert!(!s.write(&loc(7, 0, UniformKind::F32), UniformValue::F32(1.0)));
    }

    #[test]
    fn flush_uploads_only_changed_blocks_once() {
        let mut s = UniformStorage::new(&[binding(0, 0, 4), binding(0, 1, 4)]);
        s.write(&loc(1, 0, UniformKind::F32), UniformValue::F32(3.0));

        let mut uploaded = Vec::new();
        s.flush_with(|i, bytes| uploaded.push((i, bytes.len())));
        assert_eq!(uploaded, vec![(1, 16)]);

        uploaded.clear();
        s.flush_with(|i, bytes| uploaded.push((i, bytes.len())));
        assert!(uploaded.is_empty());
    }

    #[test]
    fn rewriting_same_value_does_not_dirty() {
        let mut s = UniformStorage::new(&[binding(0, 0, 4)]);
        s.write(&loc(0, 0, UniformKind::F32), UniformValue::F32(2.0));
        s.flush_with(|_, _| {});
        s.write(&loc(0, 0, UniformKind::F32), UniformValue::F32(2.0));
        assert!(!s.blocks()[0].is_dirty());
    }
}
