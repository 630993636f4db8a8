//! Integration tests for struct declaration and the layout rule

use typeview::{
    coerce_float32, coerce_int16, coerce_int8, coerce_uint32, coerce_uint8, compute_layout,
    define_struct, Region, StructOptions, TypeDescriptor, Update, Value, ViewError, ANY, FLOAT32,
    FLOAT64, INT16, INT32, INT8, OBJECT, STRING, UINT16, UINT32, UINT8,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn mixed_fields() -> Vec<(&'static str, TypeDescriptor)> {
        vec![
            ("tag", UINT8),
            ("count", UINT16),
            ("weight", FLOAT64),
            ("flag", INT8),
            ("scale", FLOAT32),
            ("id", INT32),
        ]
    }

    #[test]
    fn test_layout_is_deterministic() {
        let a = define_struct(mixed_fields(), StructOptions::transparent()).unwrap();
        let b = define_struct(mixed_fields(), StructOptions::transparent()).unwrap();
        let a = a.as_struct().unwrap();
        let b = b.as_struct().unwrap();

        assert_eq!(a.size(), b.size());
        assert_eq!(a.align(), b.align());
        let offsets_a: Vec<usize> = a.fields().iter().map(|f| f.offset()).collect();
        let offsets_b: Vec<usize> = b.fields().iter().map(|f| f.offset()).collect();
        assert_eq!(offsets_a, offsets_b);
        assert_eq!(offsets_a, vec![0, 2, 8, 16, 20, 24]);
        assert_eq!(a.size(), 32);
        assert_eq!(a.align(), 8);
    }

    #[test]
    fn test_alignment_invariant_holds() {
        let inner = define_struct([("a", INT16), ("b", UINT8)], StructOptions::transparent())
            .unwrap();
        let declarations: Vec<Vec<(&str, TypeDescriptor)>> = vec![
            mixed_fields(),
            vec![("a", UINT8), ("b", UINT8), ("c", UINT8)],
            vec![("p", UINT8), ("inner", inner.clone()), ("q", UINT32)],
            vec![("inner", inner.clone()), ("z", INT8)],
            vec![("d", FLOAT64), ("inner", inner)],
        ];

        for fields in declarations {
            let ty = define_struct(fields, StructOptions::transparent()).unwrap();
            let st = ty.as_struct().unwrap();
            assert_eq!(st.size() % st.align(), 0, "{:?}", ty);
            let mut previous = 0;
            for field in st.fields() {
                assert_eq!(field.offset() % field.ty().align(), 0, "{}", field.name());
                assert!(field.offset() >= previous);
                previous = field.offset() + field.ty().size();
            }
            assert!(previous <= st.size());
        }
    }

    #[test]
    fn test_nested_struct_contributes_its_own_alignment() {
        let bytes = define_struct([("a", UINT8), ("b", UINT8)], StructOptions::transparent())
            .unwrap();
        assert_eq!(bytes.align(), 1);
        assert_eq!(bytes.size(), 2);

        let outer = define_struct(
            [("tag", UINT8), ("pair", bytes)],
            StructOptions::transparent(),
        )
        .unwrap();
        let st = outer.as_struct().unwrap();
        assert_eq!(st.field("pair").unwrap().offset(), 1);
        assert_eq!(st.size(), 3);
        assert_eq!(st.align(), 1);
    }

    #[test]
    fn test_compute_layout_matches_define() {
        let fields: Vec<(String, TypeDescriptor)> = mixed_fields()
            .into_iter()
            .map(|(n, t)| (n.to_string(), t))
            .collect();
        let layout = compute_layout(&fields).unwrap();
        let ty = define_struct(fields, StructOptions::transparent()).unwrap();
        assert_eq!(layout.size, ty.size());
        assert_eq!(layout.align, ty.align());
    }

    #[test]
    fn test_opaque_fields_rejected() {
        for opaque in [ANY, OBJECT, STRING] {
            let err = define_struct([("x", INT32), ("r", opaque)], StructOptions::transparent())
                .unwrap_err();
            assert!(matches!(err, ViewError::OpaqueField { ref field, .. } if field == "r"));
            assert!(err.is_unsupported());
        }
    }

    #[test]
    fn test_non_transparent_and_defaults_rejected() {
        let err = define_struct(
            [("x", INT32)],
            StructOptions::transparent().with_transparent(false),
        )
        .unwrap_err();
        assert!(matches!(err, ViewError::NotTransparent));

        let err = define_struct(
            [("x", INT32)],
            StructOptions::transparent().with_defaults(Update::new().set("x", 1)),
        )
        .unwrap_err();
        assert!(matches!(err, ViewError::Unsupported { .. }));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = define_struct([("x", INT32), ("x", INT8)], StructOptions::transparent())
            .unwrap_err();
        assert!(matches!(err, ViewError::DuplicateField { ref name } if name == "x"));
    }

    #[test]
    fn test_unsupported_surfaces() {
        let point = define_struct([("x", INT32), ("y", INT32)], StructOptions::transparent())
            .unwrap();
        let st = point.as_struct().unwrap();
        assert!(st.array(4).unwrap_err().is_unsupported());
        assert!(st.instantiate().unwrap_err().is_unsupported());

        let region = Region::heap(16).unwrap();
        assert!(INT32.view(&region, 0).unwrap_err().is_unsupported());
        assert!(STRING.view(&region, 0).unwrap_err().is_unsupported());
        assert!(ANY.coerce(1).unwrap_err().is_unsupported());
        assert!(point.coerce(1).is_err());
        // Neither failure materializes the window cache
        assert!(!region.has_windows());
    }

    #[test]
    fn test_errors_reproduce() {
        let region = Region::heap(16).unwrap();
        let point = define_struct([("x", INT32), ("y", INT32)], StructOptions::transparent())
            .unwrap();
        let first = point.view(&region, 3).unwrap_err().to_string();
        let second = point.view(&region, 3).unwrap_err().to_string();
        assert_eq!(first, second);
    }

    #[test]
    fn test_standalone_coercion() {
        assert_eq!(coerce_int8(-256), 0);
        assert_eq!(coerce_int8(-257), -1);
        assert_eq!(coerce_int8(128), -128);
        assert_eq!(coerce_uint8(-1), 255);
        assert_eq!(coerce_int16(40000), -25536);
        assert_eq!(coerce_uint32(-1), u32::MAX);
        assert_eq!(coerce_int8(f64::NAN), 0);
        assert_eq!(coerce_uint8(3.99), 3);
        assert_eq!(coerce_float32(1.0e40), f32::INFINITY);

        assert_eq!(INT8.coerce(-257).unwrap(), Value::Int8(-1));
        assert_eq!(UINT16.coerce(-2).unwrap(), Value::Uint16(65534));
    }
}
