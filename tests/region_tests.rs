//! Integration tests for mapped regions and layout schemas

use tempfile::TempDir;
use typeview::{
    define_struct,
    memory::{BackingType, Region, RegionConfig},
    LayoutSchema, StructOptions, TypeDescriptor, Update, Value, FLOAT64, INT32, UINT16,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TypeDescriptor {
        let point = define_struct(
            [("x", INT32), ("y", INT32)],
            StructOptions::transparent().with_name("Point"),
        )
        .unwrap();
        define_struct(
            [("seq", UINT16), ("at", point), ("value", FLOAT64)],
            StructOptions::transparent().with_name("Sample"),
        )
        .unwrap()
    }

    #[test]
    fn test_file_backed_region_persists_view_writes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("samples.bin");
        let ty = sample();

        {
            let config = RegionConfig::new("samples", 4096)
                .with_backing_type(BackingType::FileBacked)
                .with_file_path(&path);
            let region = Region::new(config).unwrap();
            assert_eq!(region.backing_type(), BackingType::FileBacked);
            assert_eq!(region.len(), 4096);

            let view = ty.view(&region, 64).unwrap();
            view.assign(
                &Update::new()
                    .set("seq", 7)
                    .record("at", Update::new().set("x", -3).set("y", 9))
                    .set("value", 1.25),
            )
            .unwrap();
            region.flush().unwrap();
        }

        let reopened = Region::new(
            RegionConfig::new("samples", 4096)
                .with_backing_type(BackingType::FileBacked)
                .with_file_path(&path)
                .with_create(false),
        )
        .unwrap();
        let view = ty.view(&reopened, 64).unwrap();
        assert_eq!(view.get("seq").unwrap(), Value::Uint16(7));
        assert_eq!(view.field("at").unwrap().get("x").unwrap(), Value::Int32(-3));
        assert_eq!(view.get("value").unwrap(), Value::Float64(1.25));
    }

    #[test]
    fn test_opening_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let config = RegionConfig::new("missing", 64)
            .with_backing_type(BackingType::FileBacked)
            .with_file_path(temp_dir.path().join("absent.bin"))
            .with_create(false);
        assert!(Region::new(config).is_err());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_memfd_region() {
        let config = RegionConfig::new("typeview_memfd", 1024).with_backing_type(BackingType::MemFd);
        let region = Region::new(config).unwrap();
        assert_eq!(region.backing_type(), BackingType::MemFd);
        assert!(region.to_vec().iter().all(|b| *b == 0));

        let ty = sample();
        let view = ty.view(&region, 0).unwrap();
        view.set("value", 2.5).unwrap();
        assert_eq!(region.windows().float64().get(2), Some(2.5));
        assert!(region.flush().is_ok());
    }

    #[test]
    fn test_from_bytes_region() {
        let mut bytes = vec![0u8; 24];
        bytes[4..8].copy_from_slice(&11i32.to_le_bytes());
        bytes[16..24].copy_from_slice(&0.5f64.to_le_bytes());
        let region = Region::from_bytes(&bytes).unwrap();

        let ty = sample();
        let view = ty.view(&region, 0).unwrap();
        assert_eq!(view.field("at").unwrap().get("x").unwrap(), Value::Int32(11));
        assert_eq!(view.get("value").unwrap(), Value::Float64(0.5));
    }

    #[test]
    fn test_schema_shipped_through_file() {
        let temp_dir = TempDir::new().unwrap();
        let schema_path = temp_dir.path().join("sample.schema");
        let ty = sample();
        let schema = ty.as_struct().unwrap().schema();
        assert_eq!(schema.size, 24);
        assert_eq!(schema.align, 8);

        std::fs::write(&schema_path, schema.to_bytes().unwrap()).unwrap();
        let loaded = LayoutSchema::from_bytes(&std::fs::read(&schema_path).unwrap()).unwrap();
        assert_eq!(loaded, schema);

        let rebuilt = loaded.define().unwrap();
        assert!(rebuilt.as_struct().unwrap().schema().is_compatible_with(&schema));

        let leaves: Vec<String> = loaded.leaves().into_iter().map(|(path, _, _)| path).collect();
        assert_eq!(leaves, vec!["seq", "at.x", "at.y", "value"]);
    }
}
