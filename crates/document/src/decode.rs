use crate::gltf::Document;
use crate::DocumentError;
use lucent_common::{ComponentType, ElementType, TypedBuffer};
use std::collections::BTreeMap;
use tracing::debug;

/// Collaborator that resolves a buffer's external locator to raw bytes.
pub trait BufferLoader {
    fn load(&mut self, uri: &str) -> Result<Vec<u8>, DocumentError>;
}

/// A decoded accessor: typed component array plus its declared shape.
#[derive(Debug, Clone)]
pub struct DecodedAttribute {
    pub data: TypedBuffer,
    pub component_type: ComponentType,
    pub element_type: ElementType,
}

impl DecodedAttribute {
    /// Number of whole elements in the decoded buffer.
    pub fn element_count(&self) -> usize {
        self.data.len() / self.element_type.component_count()
    }
}

/// Resolves accessors through bufferViews into typed arrays.
///
/// Raw buffers are fetched at most once and cached by buffer index. A buffer
/// without a locator must be buffer 0 backed by the container's embedded
/// binary chunk.
pub struct AttributeDecoder {
    glb_chunk: Option<Vec<u8>>,
    cache: BTreeMap<usize, Vec<u8>>,
}

impl AttributeDecoder {
    pub fn new(glb_chunk: Option<Vec<u8>>) -> Self {
        Self {
            glb_chunk,
            cache: BTreeMap::new(),
        }
    }

    /// Decode one accessor into a typed array.
    ///
    /// The bufferView's byte window is sliced first, then the accessor's own
    /// byte offset within that window; the remainder is reinterpreted as the
    /// accessor's component type.
    pub fn decode(
        &mut self,
        doc: &Document,
        loader: &mut dyn BufferLoader,
        accessor_index: usize,
    ) -> Result<DecodedAttribute, DocumentError> {
        let accessor = doc
            .accessors
            .get(accessor_index)
            .ok_or(DocumentError::AccessorOutOfRange(accessor_index))?;
        let view_index = accessor.buffer_view.unwrap_or(0);
        let view = doc
            .buffer_views
            .get(view_index)
            .ok_or(DocumentError::BufferViewOutOfRange(view_index))?;

        let bytes = self.buffer_bytes(doc, loader, view.buffer)?;

        let start = view.byte_offset;
        let end = start + view.byte_length;
        if end > bytes.len() {
            return Err(DocumentError::ByteRange {
                start,
                end,
                len: bytes.len(),
            });
        }
        let window = &bytes[start..end];
        if accessor.byte_offset > window.len() {
            return Err(DocumentError::ByteRange {
                start: accessor.byte_offset,
                end: window.len(),
                len: window.len(),
            });
        }
        let payload = &window[accessor.byte_offset..];

        let component_type = ComponentType::try_from(accessor.component_type)?;
        let element_type = ElementType::parse(&accessor.element_type)?;
        let data = reinterpret(payload, component_type);

        debug!(
            accessor = accessor_index,
            components = data.len(),
            ?component_type,
            "decoded accessor"
        );

        Ok(DecodedAttribute {
            data,
            component_type,
            element_type,
        })
    }

    /// Raw bytes of an image, either from a bufferView slice or by locator.
    pub fn image_bytes(
        &mut self,
        doc: &Document,
        loader: &mut dyn BufferLoader,
        image_index: usize,
    ) -> Result<Vec<u8>, DocumentError> {
        let image = doc
            .images
            .get(image_index)
            .ok_or(DocumentError::ImageOutOfRange(image_index))?;

        if let Some(view_index) = image.buffer_view {
            let view = doc
                .buffer_views
                .get(view_index)
                .ok_or(DocumentError::BufferViewOutOfRange(view_index))?;
            let bytes = self.buffer_bytes(doc, loader, view.buffer)?;
            let start = view.byte_offset;
            let end = start + view.byte_length;
            if end > bytes.len() {
                return Err(DocumentError::ByteRange {
                    start,
                    end,
                    len: bytes.len(),
                });
            }
            return Ok(bytes[start..end].to_vec());
        }

        match &image.uri {
            Some(uri) => loader.load(uri),
            None => Err(DocumentError::ImageOutOfRange(image_index)),
        }
    }

    fn buffer_bytes(
        &mut self,
        doc: &Document,
        loader: &mut dyn BufferLoader,
        buffer_index: usize,
    ) -> Result<&[u8], DocumentError> {
        if doc.buffers.is_empty() {
            return Err(DocumentError::NoBuffers);
        }
        if !self.cache.contains_key(&buffer_index) {
            let buffer = doc
                .buffers
                .get(buffer_index)
                .ok_or(DocumentError::BufferOutOfRange(buffer_index))?;
            let bytes = match &buffer.uri {
                Some(uri) => loader.load(uri)?,
                None => {
                    // Embedded container chunk is only legal as buffer 0.
                    if buffer_index != 0 {
                        return Err(DocumentError::MissingLocator(buffer_index));
                    }
                    self.glb_chunk
                        .clone()
                        .ok_or(DocumentError::MissingBinaryChunk(buffer_index))?
                }
            };
            self.cache.insert(buffer_index, bytes);
        }
        Ok(self.cache[&buffer_index].as_slice())
    }
}

/// Reinterpret little-endian bytes as a typed component array, trimming any
/// trailing remainder shorter than one component.
fn reinterpret(bytes: &[u8], component_type: ComponentType) -> TypedBuffer {
    let width = component_type.byte_width();
    let whole = bytes.len() / width * width;
    let bytes = &bytes[..whole];
    match component_type {
        ComponentType::I8 => TypedBuffer::I8(bytemuck::pod_collect_to_vec(bytes)),
        ComponentType::U8 => TypedBuffer::U8(bytes.to_vec()),
        ComponentType::I16 => TypedBuffer::I16(
            bytes
                .chunks_exact(2)
                .map(|c| i16::from_le_bytes([c[0], c[1]]))
                .collect(),
        ),
        ComponentType::U16 => TypedBuffer::U16(
            bytes
                .chunks_exact(2)
                .map(|c| u16::from_le_bytes([c[0], c[1]]))
                .collect(),
        ),
        ComponentType::U32 => TypedBuffer::U32(
            bytes
                .chunks_exact(4)
                .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        ),
        ComponentType::F32 => TypedBuffer::F32(
            bytes
                .chunks_exact(4)
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gltf::{Accessor, Buffer, BufferView};

    struct MapLoader(BTreeMap<String, Vec<u8>>);

    impl BufferLoader for MapLoader {
        fn load(&mut self, uri: &str) -> Result<Vec<u8>, DocumentError> {
            self.0
                .get(uri)
                .cloned()
                .ok_or_else(|| DocumentError::Load(uri.to_string()))
        }
    }

    fn doc_with_accessor(
        component_type: u32,
        element_type: &str,
        byte_offset: usize,
        view: BufferView,
        buffer: Buffer,
    ) -> Document {
        Document {
            accessors: vec![Accessor {
                buffer_view: Some(0),
                byte_offset,
                component_type,
                count: 0,
                element_type: element_type.to_string(),
            }],
            buffer_views: vec![view],
            buffers: vec![buffer],
            ..Document::default()
        }
    }

    #[test]
    fn ushort_round_trip_little_endian() {
        let source: Vec<u16> = vec![3, 1, 4, 1, 5, 9];
        let bytes: Vec<u8> = source.iter().flat_map(|v| v.to_le_bytes()).collect();
        let doc = doc_with_accessor(
            5123,
            "SCALAR",
            0,
            BufferView {
                buffer: 0,
                byte_offset: 0,
                byte_length: bytes.len(),
                byte_stride: None,
            },
            Buffer {
                uri: Some("data.bin".into()),
                byte_length: bytes.len(),
            },
        );
        let mut loader = MapLoader(BTreeMap::from([("data.bin".to_string(), bytes)]));
        let mut decoder = AttributeDecoder::new(None);

        let decoded = decoder.decode(&doc, &mut loader, 0).unwrap();
        assert_eq!(decoded.component_type, ComponentType::U16);
        assert_eq!(decoded.data, TypedBuffer::U16(source));
    }

    #[test]
    fn signed_bytes_decode_two_complement() {
        let doc = doc_with_accessor(
            5120,
            "SCALAR",
            0,
            BufferView {
                buffer: 0,
                byte_offset: 0,
                byte_length: 3,
                byte_stride: None,
            },
            Buffer {
                uri: Some("s.bin".into()),
                byte_length: 3,
            },
        );
        let mut loader = MapLoader(BTreeMap::from([("s.bin".to_string(), vec![0xff, 0x00, 0x7f])]));
        let mut decoder = AttributeDecoder::new(None);

        let decoded = decoder.decode(&doc, &mut loader, 0).unwrap();
        assert_eq!(decoded.data, TypedBuffer::I8(vec![-1, 0, 127]));
    }

    #[test]
    fn accessor_offset_slices_within_view_window() {
        // 8 floats; the view covers the middle 4, the accessor skips 1 more.
        let floats: Vec<f32> = (0..8).map(|i| i as f32).collect();
        let bytes: Vec<u8> = floats.iter().flat_map(|v| v.to_le_bytes()).collect();
        let doc = doc_with_accessor(
            5126,
            "SCALAR",
            4,
            BufferView {
                buffer: 0,
                byte_offset: 8,
                byte_length: 16,
                byte_stride: None,
            },
            Buffer {
                uri: Some("b.bin".into()),
                byte_length: bytes.len(),
            },
        );
        let mut loader = MapLoader(BTreeMap::from([("b.bin".to_string(), bytes)]));
        let mut decoder = AttributeDecoder::new(None);

        let decoded = decoder.decode(&doc, &mut loader, 0).unwrap();
        assert_eq!(decoded.data, TypedBuffer::F32(vec![3.0, 4.0, 5.0]));
    }

    #[test]
    fn embedded_chunk_only_valid_at_index_zero() {
        let mut doc = doc_with_accessor(
            5121,
            "SCALAR",
            0,
            BufferView {
                buffer: 1,
                byte_offset: 0,
                byte_length: 2,
                byte_stride: None,
            },
            Buffer {
                uri: Some("a.bin".into()),
                byte_length: 2,
            },
        );
        doc.buffers.push(Buffer {
            uri: None,
            byte_length: 2,
        });
        let mut loader = MapLoader(BTreeMap::new());
        let mut decoder = AttributeDecoder::new(Some(vec![7, 8]));

        let err = decoder.decode(&doc, &mut loader, 0).unwrap_err();
        assert!(matches!(err, DocumentError::MissingLocator(1)));
    }

    #[test]
    fn embedded_chunk_serves_buffer_zero() {
        let doc = doc_with_accessor(
            5121,
            "SCALAR",
            0,
            BufferView {
                buffer: 0,
                byte_offset: 0,
                byte_length: 3,
                byte_stride: None,
            },
            Buffer {
                uri: None,
                byte_length: 3,
            },
        );
        let mut loader = MapLoader(BTreeMap::new());
        let mut decoder = AttributeDecoder::new(Some(vec![9, 8, 7]));

        let decoded = decoder.decode(&doc, &mut loader, 0).unwrap();
        assert_eq!(decoded.data, TypedBuffer::U8(vec![9, 8, 7]));
    }

    #[test]
    fn missing_chunk_is_fatal() {
        let doc = doc_with_accessor(
            5121,
            "SCALAR",
            0,
            BufferView {
                buffer: 0,
                byte_offset: 0,
                byte_length: 1,
                byte_stride: None,
            },
            Buffer {
                uri: None,
                byte_length: 1,
            },
        );
        let mut loader = MapLoader(BTreeMap::new());
        let mut decoder = AttributeDecoder::new(None);
        assert!(matches!(
            decoder.decode(&doc, &mut loader, 0),
            Err(DocumentError::MissingBinaryChunk(0))
        ));
    }

    #[test]
    fn no_buffers_is_fatal() {
        let mut doc = doc_with_accessor(
            5121,
            "SCALAR",
            0,
            BufferView {
                buffer: 0,
                byte_offset: 0,
                byte_length: 1,
                byte_stride: None,
            },
            Buffer::default(),
        );
        doc.buffers.clear();
        let mut loader = MapLoader(BTreeMap::new());
        let mut decoder = AttributeDecoder::new(None);
        assert!(matches!(
            decoder.decode(&doc, &mut loader, 0),
            Err(DocumentError::NoBuffers)
        ));
    }

    #[test]
    fn buffers_are_loaded_once() {
        struct CountingLoader {
            calls: usize,
            bytes: Vec<u8>,
        }
        impl BufferLoader for CountingLoader {
            fn load(&mut self, _uri: &str) -> Result<Vec<u8>, DocumentError> {
                self.calls += 1;
                Ok(self.bytes.clone())
            }
        }

        let doc = doc_with_accessor(
            5121,
            "SCALAR",
            0,
            BufferView {
                buffer: 0,
                byte_offset: 0,
                byte_length: 4,
                byte_stride: None,
            },
            Buffer {
                uri: Some("x.bin".into()),
                byte_length: 4,
            },
        );
        let mut loader = CountingLoader {
            calls: 0,
            bytes: vec![1, 2, 3, 4],
        };
        let mut decoder = AttributeDecoder::new(None);
        decoder.decode(&doc, &mut loader, 0).unwrap();
        decoder.decode(&doc, &mut loader, 0).unwrap();
        assert_eq!(loader.calls, 1);
    }
}
