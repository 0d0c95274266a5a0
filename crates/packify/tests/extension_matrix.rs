use std::sync::Arc;
use std::thread;

use packify::builtin::{MapEntry, StrWrapper};
use packify::{
    decode, encode, encode_native, DecoderOptions, Extension, FramingError, PackDecoder,
    PackError, Packable, Registry, UsageError, Value, DEFAULT_MAX_DEPTH,
};

#[derive(Debug, Clone, PartialEq)]
struct Point {
    x: f64,
    y: f64,
}

impl Packable for Point {
    const TYPE_NAME: &'static str = "Point";

    fn pack(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(16);
        out.extend(self.x.to_be_bytes());
        out.extend(self.y.to_be_bytes());
        out
    }

    fn unpack(data: &[u8], _registry: &Registry) -> Result<Self, PackError> {
        let bytes: [u8; 16] = data
            .try_into()
            .map_err(|_| PackError::extension(Self::TYPE_NAME, "expected 16 bytes"))?;
        let (x, y) = bytes.split_at(8);
        let read = |half: &[u8]| {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(half);
            f64::from_be_bytes(buf)
        };
        Ok(Point {
            x: read(x),
            y: read(y),
        })
    }
}

/// Holds any other extension value, resolved through the active registry.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Boxed(Extension);

impl Packable for Boxed {
    const TYPE_NAME: &'static str = "Boxed";

    fn pack(&self) -> Vec<u8> {
        self.0.to_body()
    }

    fn unpack(data: &[u8], registry: &Registry) -> Result<Self, PackError> {
        Extension::from_body(data, registry).map(Boxed)
    }
}

#[test]
fn injected_type_roundtrips() {
    let point = Point { x: 1.5, y: -2.0 };
    let bytes = encode(&Value::extension(point.clone())).unwrap();

    let inject = Registry::new().with::<Point>();
    let value = decode(&bytes, Some(&inject)).unwrap();
    assert_eq!(value.downcast_ref::<Point>(), Some(&point));
}

#[test]
fn missing_type_is_a_usage_error() {
    let bytes = encode(&Value::extension(Point { x: 0.0, y: 0.0 })).unwrap();
    let err = decode(&bytes, None).unwrap_err();
    assert_eq!(
        err,
        PackError::Usage(UsageError::UnknownExtension("Point".into()))
    );

    let empty = Registry::new();
    let err = PackDecoder::new(&empty).decode(&bytes).unwrap_err();
    assert!(err.is_usage());
    // even the built-ins need a registry entry
    let wrapped = encode(&Value::extension(StrWrapper::new("s"))).unwrap();
    assert!(PackDecoder::new(&empty).decode(&wrapped).unwrap_err().is_usage());
}

#[test]
fn handler_errors_surface_as_usage_errors() {
    let bytes = encode(&Value::Extension(Extension::from_parts("Point", vec![1, 2, 3]))).unwrap();
    let inject = Registry::new().with::<Point>();
    let err = decode(&bytes, Some(&inject)).unwrap_err();
    assert_eq!(err, PackError::extension("Point", "expected 16 bytes"));
}

#[test]
fn extension_frame_layout() {
    let bytes = encode(&Value::extension(StrWrapper::new("hi"))).unwrap();
    assert_eq!(bytes[0], b'p');
    assert_eq!(&bytes[1..5], &23u32.to_be_bytes());
    assert_eq!(&bytes[5..], b"53747257726170706572_hi");
}

#[test]
fn nested_extensions_use_the_active_registry() {
    let inner = Extension::new(Point { x: 3.0, y: 4.0 });
    let value = Value::extension(Boxed(inner));
    let bytes = encode(&value).unwrap();

    let only_boxed = Registry::new().with::<Boxed>();
    let err = decode(&bytes, Some(&only_boxed)).unwrap_err();
    assert_eq!(
        err,
        PackError::Usage(UsageError::UnknownExtension("Point".into()))
    );

    let both = Registry::new().with::<Boxed>().with::<Point>();
    let back = decode(&bytes, Some(&both)).unwrap();
    assert_eq!(back, value);
    let boxed = back.downcast_ref::<Boxed>().unwrap();
    assert_eq!(
        boxed.0.downcast_ref::<Point>(),
        Some(&Point { x: 3.0, y: 4.0 })
    );
}

/// A `PackableMapEntry` whose key is nested `levels` entries deep, built
/// directly from bytes.
fn nested_map_entry_frame(levels: usize) -> Vec<u8> {
    let leaf = Extension::new(StrWrapper::new("v")).to_body();
    let mut key = leaf.clone();
    for _ in 0..levels {
        let mut data = Vec::new();
        data.extend((key.len() as u16).to_be_bytes());
        data.extend((leaf.len() as u16).to_be_bytes());
        data.extend(&key);
        data.extend(&leaf);
        key = Extension::from_parts(MapEntry::TYPE_NAME, data).to_body();
    }
    let mut frame = vec![b'p'];
    frame.extend((key.len() as u32).to_be_bytes());
    frame.extend(key);
    frame
}

#[test]
fn deeply_nested_map_entries_hit_the_depth_limit() {
    let bytes = nested_map_entry_frame(1000);
    assert!(bytes.len() < 5 + usize::from(u16::MAX));
    assert_eq!(
        decode(&bytes, None),
        Err(PackError::Framing(FramingError::DepthLimit(DEFAULT_MAX_DEPTH)))
    );
}

#[test]
fn extension_nesting_counts_toward_max_depth() {
    // outermost entry at depth 0, its innermost key StrWrapper at depth 10
    let bytes = nested_map_entry_frame(10);
    let registry = Registry::with_builtins();
    let options = |max_depth| DecoderOptions {
        max_depth,
        ..DecoderOptions::default()
    };
    assert_eq!(
        PackDecoder::with_options(&registry, options(9)).decode(&bytes),
        Err(PackError::Framing(FramingError::DepthLimit(9)))
    );
    let value = PackDecoder::with_options(&registry, options(10))
        .decode(&bytes)
        .unwrap();
    assert!(value.downcast_ref::<MapEntry>().is_some());

    // the enclosing frames count too
    let mut wrapped = vec![b'l'];
    wrapped.extend((bytes.len() as u32).to_be_bytes());
    wrapped.extend(&bytes);
    assert!(PackDecoder::with_options(&registry, options(10))
        .decode(&wrapped)
        .is_err());
    assert!(PackDecoder::with_options(&registry, options(11))
        .decode(&wrapped)
        .is_ok());
}

#[test]
fn map_entry_of_custom_types() {
    let entry = MapEntry::of(StrWrapper::new("origin"), Point { x: 0.0, y: 0.0 }).unwrap();
    let bytes = encode(&Value::extension(entry.clone())).unwrap();

    assert!(decode(&bytes, None).unwrap_err().is_usage());
    let back = decode(&bytes, Some(&Registry::new().with::<Point>())).unwrap();
    assert_eq!(back.downcast_ref::<MapEntry>(), Some(&entry));
}

#[test]
fn injected_handler_overrides_builtin() {
    let mut inject = Registry::new();
    inject.insert(
        "StrWrapper",
        |data: &[u8], _: &Registry| -> Result<Extension, PackError> {
            Ok(Extension::from_parts("StrWrapper", data.to_ascii_uppercase()))
        },
    );
    let bytes = encode(&Value::extension(StrWrapper::new("abc"))).unwrap();
    let value = decode(&bytes, Some(&inject)).unwrap();
    let ext = value.as_extension().unwrap();
    assert!(ext.is_opaque());
    assert_eq!(ext.data(), b"ABC");
    assert_eq!(
        ext.unpack_as::<StrWrapper>(&Registry::new()).unwrap(),
        StrWrapper::new("ABC")
    );
}

#[test]
fn opaque_extensions_pass_through() {
    let opaque = Extension::from_parts("Unknown.Type", vec![0, 1, 2]);
    let bytes = encode(&Value::Extension(opaque.clone())).unwrap();

    let mut inject = Registry::new();
    inject.insert(
        "Unknown.Type",
        |data: &[u8], _: &Registry| -> Result<Extension, PackError> {
            Ok(Extension::from_parts("Unknown.Type", data))
        },
    );
    let back = decode(&bytes, Some(&inject)).unwrap();
    assert_eq!(back, Value::Extension(opaque));
    assert_eq!(encode(&back).unwrap(), bytes);
}

#[test]
fn unsupported_native_kinds_are_rejected() {
    let callable = |x: i32| x + 1;
    let err = encode_native(&callable).unwrap_err();
    match err {
        PackError::Usage(UsageError::Unsupported { kind }) => {
            assert!(kind.contains("closure"), "{kind}");
        }
        other => panic!("unexpected error {other:?}"),
    }

    let err = encode_native(&std::net::Ipv4Addr::LOCALHOST).unwrap_err();
    assert!(err.to_string().contains("Ipv4Addr"), "{err}");

    assert_eq!(
        encode_native(&42i32).unwrap(),
        encode(&Value::Integer(42)).unwrap()
    );
}

#[test]
fn one_registry_serves_concurrent_decodes() {
    let registry = Arc::new(Registry::with_builtins().with::<Point>());
    let handles: Vec<_> = (0..4i32)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let point = Point {
                    x: f64::from(i),
                    y: 1.0,
                };
                let bytes = encode(&Value::extension(point.clone())).unwrap();
                let value = PackDecoder::new(&registry).decode(&bytes).unwrap();
                assert_eq!(value.downcast_ref::<Point>(), Some(&point));
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}
