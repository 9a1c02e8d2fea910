use glass_sketch::params::{BloomSettings, MaterialParams, MaterialUniform};

#[cfg(test)]
mod params_tests {
    use super::*;

    #[test]
    fn test_default_parameter_values() {
        let params = MaterialParams::default();

        assert!(!params.enable_swooping_camera);
        assert!(params.enable_rotation);
        assert_eq!(params.transmission, 1.0);
        assert_eq!(params.thickness, 1.2);
        assert_eq!(params.roughness, 0.6);
        assert_eq!(params.env_map_intensity, 1.5);
        assert_eq!(params.clearcoat, 1.0);
        assert_eq!(params.clearcoat_roughness, 0.1);
        assert_eq!(params.normal_scale, 1.0);
        assert_eq!(params.clearcoat_normal_scale, 0.3);
        assert_eq!(params.normal_repeat, 1.0);
        assert_eq!(params.bloom_threshold, 0.85);
        assert_eq!(params.bloom_strength, 0.5);
        assert_eq!(params.bloom_radius, 0.33);
    }

    #[test]
    fn test_edit_reflected_with_no_frame_delay() {
        // The write-through path is a pure derivation: as soon as the
        // panel callback mutates the record, the derived uniform shows it.
        let mut params = MaterialParams::default();

        params.roughness = 0.9;
        let uniform = MaterialUniform::from_params(&params);
        assert_eq!(uniform.roughness, 0.9);

        params.bloom_threshold = 0.1;
        let settings = BloomSettings::from_params(&params);
        assert_eq!(settings.threshold, 0.1);
    }

    #[test]
    fn test_normal_repeat_reaches_the_material_uniform() {
        let mut params = MaterialParams::default();
        params.normal_repeat = 3.0;

        let uniform = MaterialUniform::from_params(&params);
        assert_eq!(uniform.normal_repeat, 3.0);
    }

    #[test]
    fn test_preset_file_round_trip() {
        let dir = std::env::temp_dir().join(format!("glass-sketch-preset-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("preset.json");

        let mut params = MaterialParams::default();
        params.transmission = 0.4;
        params.bloom_radius = 0.9;
        std::fs::write(&path, serde_json::to_string_pretty(&params).unwrap()).unwrap();

        let loaded = MaterialParams::from_preset_file(&path).unwrap();
        assert_eq!(loaded, params);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_preset_file_is_an_error() {
        assert!(MaterialParams::from_preset_file("does/not/exist.json").is_err());
    }

    #[test]
    fn test_garbage_preset_is_an_error() {
        let dir = std::env::temp_dir().join(format!("glass-sketch-garbage-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("preset.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(MaterialParams::from_preset_file(&path).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }
}
