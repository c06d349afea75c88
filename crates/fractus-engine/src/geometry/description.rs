use serde::Deserialize;

use super::error::GeometryShapeError;

/// Indexed triangle geometry as loaded from disk.
///
/// ```json
/// { "triangles": [[0, 1, 2], [0, 2, 3]],
///   "attributes": [[[-1, -1], [1, -1], [1, 1], [-1, 1]]] }
/// ```
///
/// Attribute `i` feeds vertex shader `@location(i)`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeometryDescription {
    pub triangles: Vec<[u32; 3]>,
    pub attributes: Vec<Vec<Vec<f32>>>,
}

/// How to issue the draw call for a geometry.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DrawDescriptor {
    pub topology: wgpu::PrimitiveTopology,
    /// Number of indices.
    pub count: u32,
    pub index_format: wgpu::IndexFormat,
}

/// Vertex input slot as seen by the pipeline.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AttributeLayout {
    pub slot: u32,
    /// f32 components per vertex (1..=4).
    pub components: u32,
}

impl AttributeLayout {
    pub fn vertex_format(self) -> wgpu::VertexFormat {
        match self.components {
            1 => wgpu::VertexFormat::Float32,
            2 => wgpu::VertexFormat::Float32x2,
            3 => wgpu::VertexFormat::Float32x3,
            _ => wgpu::VertexFormat::Float32x4,
        }
    }

    pub fn stride(self) -> u64 {
        u64::from(self.components) * std::mem::size_of::<f32>() as u64
    }
}

/// One attribute flattened into tightly packed f32 data.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedAttribute {
    pub layout: AttributeLayout,
    pub data: Vec<f32>,
}

/// Validated, GPU-ready geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedGeometry {
    pub indices: Vec<u16>,
    pub attributes: Vec<PreparedAttribute>,
    pub vertex_count: u32,
    pub draw: DrawDescriptor,
}

impl PreparedGeometry {
    pub fn layouts(&self) -> Vec<AttributeLayout> {
        self.attributes.iter().map(|a| a.layout).collect()
    }
}

impl GeometryDescription {
    pub fn from_json(text: &str) -> Result<Self, GeometryShapeError> {
        serde_json::from_str(text).map_err(|e| GeometryShapeError::Malformed(e.to_string()))
    }

    /// Validates the description and flattens it for upload.
    pub fn prepare(&self) -> Result<PreparedGeometry, GeometryShapeError> {
        if self.triangles.is_empty() {
            return Err(GeometryShapeError::NoTriangles);
        }
        if self.attributes.is_empty() {
            return Err(GeometryShapeError::NoAttributes);
        }

        let max_index = self.triangles.iter().flatten().copied().max().unwrap_or(0);
        if max_index > u32::from(u16::MAX) {
            return Err(GeometryShapeError::IndexTooWide { index: max_index });
        }
        let vertex_count = max_index as usize + 1;

        let mut attributes = Vec::with_capacity(self.attributes.len());
        for (slot, attr) in self.attributes.iter().enumerate() {
            if attr.len() != vertex_count {
                return Err(GeometryShapeError::VertexCount {
                    attribute: slot,
                    expected: vertex_count,
                    found: attr.len(),
                });
            }

            let components = attr[0].len();
            if !(1..=4).contains(&components) {
                return Err(GeometryShapeError::ComponentCount { attribute: slot, components });
            }

            let mut data = Vec::with_capacity(vertex_count * components);
            for (vertex, v) in attr.iter().enumerate() {
                if v.len() != components {
                    return Err(GeometryShapeError::RaggedAttribute {
                        attribute: slot,
                        vertex,
                        expected: components,
                        found: v.len(),
                    });
                }
                if v.iter().any(|c| !c.is_finite()) {
                    return Err(GeometryShapeError::NonFinite { attribute: slot, vertex });
                }
                data.extend_from_slice(v);
            }

            attributes.push(PreparedAttribute {
                layout: AttributeLayout {
                    slot: slot as u32,
                    components: components as u32,
                },
                data,
            });
        }

        // Bounded by the u16 check above.
        let indices: Vec<u16> = self.triangles.iter().flatten().map(|&i| i as u16).collect();

        Ok(PreparedGeometry {
            draw: DrawDescriptor {
                topology: wgpu::PrimitiveTopology::TriangleList,
                count: indices.len() as u32,
                index_format: wgpu::IndexFormat::Uint16,
            },
            indices,
            attributes,
            vertex_count: vertex_count as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> GeometryDescription {
        GeometryDescription {
            triangles: vec![[0, 1, 2], [0, 2, 3]],
            attributes: vec![vec![
                vec![-1.0, -1.0],
                vec![1.0, -1.0],
                vec![1.0, 1.0],
                vec![-1.0, 1.0],
            ]],
        }
    }

    // ---------------------------------------------------------------------
    // accepted shapes
    // ---------------------------------------------------------------------

    #[test]
    fn quad_prepares_to_six_u16_indices() {
        let g = quad().prepare().unwrap();
        assert_eq!(g.draw.count, 6);
        assert_eq!(g.draw.index_format, wgpu::IndexFormat::Uint16);
        assert_eq!(g.draw.topology, wgpu::PrimitiveTopology::TriangleList);
        assert_eq!(g.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(g.vertex_count, 4);
    }

    #[test]
    fn element_count_is_three_per_triangle() {
        let mut d = quad();
        d.triangles = vec![[0, 1, 2]; 7];
        assert_eq!(d.prepare().unwrap().draw.count, 21);
    }

    #[test]
    fn attributes_get_consecutive_slots() {
        let mut d = quad();
        d.attributes.push(vec![vec![0.5]; 4]);
        d.attributes.push(vec![vec![0.0, 0.0, 1.0, 1.0]; 4]);

        let g = d.prepare().unwrap();
        assert_eq!(
            g.layouts(),
            vec![
                AttributeLayout { slot: 0, components: 2 },
                AttributeLayout { slot: 1, components: 1 },
                AttributeLayout { slot: 2, components: 4 },
            ]
        );
        assert_eq!(g.attributes[0].data.len(), 8);
        assert_eq!(g.attributes[2].layout.vertex_format(), wgpu::VertexFormat::Float32x4);
        assert_eq!(g.attributes[2].layout.stride(), 16);
    }

    #[test]
    fn parses_json() {
        let d = GeometryDescription::from_json(
            r#"{"triangles":[[0,1,2],[0,2,3]],"attributes":[[[-1,-1],[1,-1],[1,1],[-1,1]]]}"#,
        )
        .unwrap();
        assert_eq!(d, quad());
    }

    // ---------------------------------------------------------------------
    // rejected shapes
    // ---------------------------------------------------------------------

    #[test]
    fn malformed_json_is_rejected() {
        let err = GeometryDescription::from_json(r#"{"triangles":[[0,1]]}"#).unwrap_err();
        assert!(matches!(err, GeometryShapeError::Malformed(_)));
    }

    #[test]
    fn empty_triangles_are_rejected() {
        let mut d = quad();
        d.triangles.clear();
        assert_eq!(d.prepare(), Err(GeometryShapeError::NoTriangles));
    }

    #[test]
    fn missing_attributes_are_rejected() {
        let mut d = quad();
        d.attributes.clear();
        assert_eq!(d.prepare(), Err(GeometryShapeError::NoAttributes));
    }

    #[test]
    fn attribute_length_must_match_max_index() {
        let mut d = quad();
        d.attributes[0].pop();
        assert_eq!(
            d.prepare(),
            Err(GeometryShapeError::VertexCount { attribute: 0, expected: 4, found: 3 })
        );

        let mut d = quad();
        d.attributes[0].push(vec![0.0, 0.0]);
        assert!(matches!(d.prepare(), Err(GeometryShapeError::VertexCount { found: 5, .. })));
    }

    #[test]
    fn component_count_out_of_range_is_rejected() {
        let mut d = quad();
        d.attributes[0] = vec![vec![0.0; 5]; 4];
        assert_eq!(
            d.prepare(),
            Err(GeometryShapeError::ComponentCount { attribute: 0, components: 5 })
        );

        d.attributes[0] = vec![vec![]; 4];
        assert!(matches!(d.prepare(), Err(GeometryShapeError::ComponentCount { components: 0, .. })));
    }

    #[test]
    fn ragged_attribute_is_rejected() {
        let mut d = quad();
        d.attributes[0][2] = vec![1.0, 1.0, 0.0];
        assert_eq!(
            d.prepare(),
            Err(GeometryShapeError::RaggedAttribute { attribute: 0, vertex: 2, expected: 2, found: 3 })
        );
    }

    #[test]
    fn index_beyond_u16_is_rejected() {
        let mut d = quad();
        d.triangles.push([0, 1, 70_000]);
        assert_eq!(d.prepare(), Err(GeometryShapeError::IndexTooWide { index: 70_000 }));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let mut d = quad();
        d.attributes[0][1][0] = f32::NAN;
        assert_eq!(d.prepare(), Err(GeometryShapeError::NonFinite { attribute: 0, vertex: 1 }));
    }
}
