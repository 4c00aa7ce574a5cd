use pangenome_launch::core::schema::{self, PARAMETERS};
use pangenome_launch::core::{ParamType, ParamValue};

#[test]
fn test_every_default_matches_declared_type() {
    for param in PARAMETERS.iter() {
        if let Some(default) = &param.default {
            assert!(
                param.ty.accepts(default),
                "{} declares {} but defaults to {:?}",
                param.name,
                param.ty,
                default
            );
        }
    }
    assert!(schema::check_table(&PARAMETERS).is_ok());
}

#[test]
fn test_workflow_defaults() {
    let expected = [
        ("wfmash_map_pct_id", ParamValue::Float(90.0)),
        ("wfmash_segment_length", ParamValue::str("5000")),
        ("wfmash_mash_kmer", ParamValue::Int(19)),
        ("wfmash_mash_kmer_thres", ParamValue::Float(0.001)),
        ("wfmash_sparse_map", ParamValue::str("1.0")),
        ("wfmash_chunks", ParamValue::Int(1)),
        ("wfmash_hg_filter_ani_diff", ParamValue::Int(30)),
        ("seqwish_min_match_length", ParamValue::Int(23)),
        ("seqwish_transclose_batch", ParamValue::str("10000000")),
        ("seqwish_sparse_factor", ParamValue::Float(0.0)),
        ("smoothxg_poa_length", ParamValue::str("700,900,1100")),
        ("smoothxg_pad_max_depth", ParamValue::Int(100)),
        ("smoothxg_poa_padding", ParamValue::Float(0.001)),
        ("smoothxg_poa_params", ParamValue::str("1,19,39,3,81,1")),
        ("smoothxg_poa_cpus", ParamValue::Int(0)),
    ];

    for (name, value) in expected {
        assert_eq!(schema::find(name).unwrap().default.as_ref(), Some(&value), "{}", name);
    }

    let with_defaults = PARAMETERS.iter().filter(|p| p.default.is_some()).count();
    assert_eq!(with_defaults, 15);
}

#[test]
fn test_section_titles_open_groups() {
    let sections: Vec<(&str, &str)> = PARAMETERS
        .iter()
        .filter_map(|p| p.section_title.map(|s| (p.name, s)))
        .collect();
    assert_eq!(
        sections,
        vec![
            ("input", "Input/output options"),
            ("wfmash_map_pct_id", "Wfmash Options"),
            ("seqwish_min_match_length", "Seqwish Options"),
            ("skip_smoothxg", "Smoothxg options"),
            ("vcf_spec", "Vg Deconstruct Options"),
            ("communities", "Community"),
            ("multiqc_methods_description", "Generic options"),
        ]
    );
}

#[test]
fn test_output_directory_is_flagged() {
    let outdir = schema::find("outdir").unwrap();
    assert_eq!(outdir.ty, ParamType::Dir { output: true });
    assert!(outdir.required);
}
