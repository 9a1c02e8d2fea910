use glass_sketch::loaders::svg::{parse_diagram, DiagramMesh};

#[cfg(test)]
mod diagram_tests {
    use super::*;

    fn count_named(meshes: &[DiagramMesh], name: &str) -> usize {
        meshes.iter().filter(|m| m.mesh.name == name).count()
    }

    #[test]
    fn test_fill_none_with_stroke_produces_only_strokes() {
        let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="200">
            <path d="M 20 20 L 180 20 L 180 180 L 20 180 Z"
                  fill="none" stroke="#2266aa" stroke-width="3"/>
        </svg>"##;

        let meshes = parse_diagram(svg).unwrap();

        assert_eq!(count_named(&meshes, "fill"), 0);
        assert_eq!(count_named(&meshes, "stroke"), 1);
    }

    #[test]
    fn test_absent_stroke_produces_only_fills() {
        let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="200">
            <path d="M 20 20 L 180 20 L 100 180 Z" fill="#aa2222"/>
        </svg>"##;

        let meshes = parse_diagram(svg).unwrap();

        assert_eq!(count_named(&meshes, "fill"), 1);
        assert_eq!(count_named(&meshes, "stroke"), 0);
    }

    #[test]
    fn test_each_path_is_handled_independently() {
        let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="200">
            <path d="M 10 10 L 90 10 L 90 90 Z" fill="none" stroke="#ffffff" stroke-width="1"/>
            <path d="M 110 10 L 190 10 L 190 90 Z" fill="#00ff00"/>
            <path d="M 10 110 L 90 110 L 90 190 Z" fill="#0000ff" stroke="#ff0000" stroke-width="2"/>
        </svg>"##;

        let meshes = parse_diagram(svg).unwrap();

        assert_eq!(count_named(&meshes, "fill"), 2);
        assert_eq!(count_named(&meshes, "stroke"), 2);
    }

    #[test]
    fn test_stroke_opacity_carried_into_mesh_color() {
        let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
            <path d="M 10 50 L 90 50" stroke="#ffffff" stroke-width="4" stroke-opacity="0.25"/>
        </svg>"##;

        let meshes = parse_diagram(svg).unwrap();
        let stroke = meshes
            .iter()
            .find(|m| m.mesh.name == "stroke")
            .expect("stroke mesh");

        assert!((stroke.color[3] - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_tessellated_meshes_carry_real_triangles() {
        let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
            <path d="M 10 10 L 90 10 L 90 90 L 10 90 Z" fill="#808080"/>
        </svg>"##;

        let meshes = parse_diagram(svg).unwrap();

        assert_eq!(meshes.len(), 1);
        let mesh = &meshes[0].mesh;
        assert!(mesh.positions.len() >= 4);
        assert!(mesh.indices.len() >= 6);
        assert_eq!(mesh.indices.len() % 3, 0, "index count must form triangles");
    }

    #[test]
    fn test_unparseable_document_is_an_error_not_a_panic() {
        let result = parse_diagram(b"this is not svg at all");
        assert!(result.is_err());
    }
}
