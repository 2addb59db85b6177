//! Barycentric de-duplication for wireframe rendering.

use std::collections::BTreeMap;

use lucent_common::TypedBuffer;

/// One vertex attribute channel before upload: typed component data plus the
/// number of components per element.
#[derive(Debug, Clone)]
pub struct AttributeChannel {
    pub buffer: TypedBuffer,
    pub arity: usize,
}

/// Rebuild the attribute channels with full vertex duplication and attach a
/// per-vertex barycentric channel.
///
/// Shared vertices cannot share one barycentric value, so sharing is
/// discarded: for N indices the output holds N elements per channel, the
/// index list becomes 0..N-1 in order, and each consecutive index triplet
/// gets the basis vectors (1,0,0)/(0,1,0)/(0,0,1) cyclically. Memory traded
/// for correctness; must be redone when source attributes or indices change.
pub fn generate_barycentric(
    channels: &BTreeMap<String, AttributeChannel>,
    indices: &[u32],
) -> (BTreeMap<String, AttributeChannel>, Vec<u32>) {
    let count = indices.len();

    let mut unique: BTreeMap<String, AttributeChannel> = channels
        .iter()
        .map(|(name, channel)| {
            (
                name.clone(),
                AttributeChannel {
                    buffer: channel.buffer.gather(indices, channel.arity),
                    arity: channel.arity,
                },
            )
        })
        .collect();

    let unique_indices: Vec<u32> = (0..count as u32).collect();

    let mut barycentric = vec![0.0f32; count * 3];
    for triangle in unique_indices.chunks_exact(3) {
        for (corner, &index) in triangle.iter().enumerate() {
            barycentric[index as usize * 3 + corner] = 1.0;
        }
    }
    unique.insert(
        "a_Barycentric".to_string(),
        AttributeChannel {
            buffer: TypedBuffer::F32(barycentric),
            arity: 3,
        },
    );

    (unique, unique_indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channels() -> BTreeMap<String, AttributeChannel> {
        // four vec3 positions forming two triangles sharing an edge
        let positions = vec![
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, //
            1.0, 1.0, 0.0,
        ];
        BTreeMap::from([(
            "a_Position".to_string(),
            AttributeChannel {
                buffer: TypedBuffer::F32(positions),
                arity: 3,
            },
        )])
    }

    #[test]
    fn output_sizes_match_index_count() {
        let indices = [0, 1, 2, 2, 1, 3];
        let (unique, unique_indices) = generate_barycentric(&channels(), &indices);

        assert_eq!(unique_indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(unique["a_Position"].buffer.len(), indices.len() * 3);
        assert_eq!(unique["a_Barycentric"].buffer.len(), indices.len() * 3);
    }

    #[test]
    fn shared_vertices_are_duplicated() {
        let indices = [0, 1, 2, 2, 1, 3];
        let (unique, _) = generate_barycentric(&channels(), &indices);
        let positions = unique["a_Position"].buffer.as_f32().unwrap();
        // slot 3 re-copies element 2, slot 4 re-copies element 1
        assert_eq!(&positions[9..12], &[0.0, 1.0, 0.0]);
        assert_eq!(&positions[12..15], &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn barycentric_components_sum_to_one_per_vertex() {
        let indices = [0, 1, 2, 2, 1, 3];
        let (unique, _) = generate_barycentric(&channels(), &indices);
        let bary = unique["a_Barycentric"].buffer.as_f32().unwrap();
        for vertex in bary.chunks_exact(3) {
            assert_eq!(vertex.iter().sum::<f32>(), 1.0);
        }
    }

    #[test]
    fn each_triplet_holds_all_three_basis_vectors() {
        let indices = [0, 1, 2, 2, 1, 3];
        let (unique, unique_indices) = generate_barycentric(&channels(), &indices);
        let bary = unique["a_Barycentric"].buffer.as_f32().unwrap();
        for triplet in unique_indices.chunks_exact(3) {
            for (corner, &index) in triplet.iter().enumerate() {
                let vertex = &bary[index as usize * 3..index as usize * 3 + 3];
                let mut expected = [0.0f32; 3];
                expected[corner] = 1.0;
                assert_eq!(vertex, &expected);
            }
        }
    }
}
