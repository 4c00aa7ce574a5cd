//! Parameter table for the nf-core/pangenome launcher.
//!
//! The order of [`PARAMETERS`] is the order flags appear on the generated
//! command line.

use crate::domain::model::{ParamType, ParamValue, Parameter};
use crate::utils::error::{LaunchError, Result};
use std::borrow::Cow;
use std::collections::HashSet;

const fn required(
    name: &'static str,
    ty: ParamType,
    section_title: Option<&'static str>,
    description: &'static str,
) -> Parameter {
    Parameter {
        name,
        ty,
        required: true,
        default: None,
        section_title,
        description,
    }
}

const fn optional(
    name: &'static str,
    ty: ParamType,
    default: Option<ParamValue>,
    section_title: Option<&'static str>,
    description: &'static str,
) -> Parameter {
    Parameter {
        name,
        ty,
        required: false,
        default,
        section_title,
        description,
    }
}

const fn text(s: &'static str) -> Option<ParamValue> {
    Some(ParamValue::Str(Cow::Borrowed(s)))
}

pub static PARAMETERS: [Parameter; 33] = [
    required(
        "input",
        ParamType::File,
        Some("Input/output options"),
        "Path to BGZIPPED input FASTA to build the pangenome graph from.",
    ),
    required(
        "n_haplotypes",
        ParamType::Float,
        None,
        "The number of haplotypes in the input FASTA.",
    ),
    required(
        "outdir",
        ParamType::Dir { output: true },
        None,
        "The output directory where the results will be saved. You have to use absolute paths to storage on Cloud infrastructure.",
    ),
    optional(
        "email",
        ParamType::Str,
        None,
        None,
        "Email address for completion summary.",
    ),
    optional(
        "multiqc_title",
        ParamType::Str,
        None,
        None,
        "MultiQC report title. Printed as page header, used for filename if not otherwise specified.",
    ),
    optional(
        "wfmash_map_pct_id",
        ParamType::Float,
        Some(ParamValue::Float(90.0)),
        Some("Wfmash Options"),
        "Percent identity in the wfmash mashmap step.",
    ),
    optional(
        "wfmash_segment_length",
        ParamType::Str,
        text("5000"),
        None,
        "Segment length for mapping.",
    ),
    optional(
        "wfmash_block_length",
        ParamType::Str,
        None,
        None,
        "Minimum block length filter for mapping.",
    ),
    optional(
        "wfmash_mash_kmer",
        ParamType::Int,
        Some(ParamValue::Int(19)),
        None,
        "Kmer size for mashmap.",
    ),
    optional(
        "wfmash_mash_kmer_thres",
        ParamType::Float,
        Some(ParamValue::Float(0.001)),
        None,
        "Ignore the top % most-frequent kmers.",
    ),
    optional(
        "wfmash_sparse_map",
        ParamType::Str,
        text("1.0"),
        None,
        "Keep this fraction of mappings (`auto` for giant component heuristic).",
    ),
    optional(
        "wfmash_merge_segments",
        ParamType::Bool,
        None,
        None,
        "Merge successive mappings.",
    ),
    optional(
        "wfmash_exclude_delim",
        ParamType::Str,
        None,
        None,
        "Skip mappings between sequences with the same name prefix before the given delimiter character. This can be helpful if several sequences originate from the same chromosome. It is recommended that the sequence names respect the https://github.com/pangenome/PanSN-spec. In future versions of the pipeline it will be required that the sequence names follow this specification.",
    ),
    optional(
        "wfmash_chunks",
        ParamType::Int,
        Some(ParamValue::Int(1)),
        None,
        "The number of files to generate from the approximate wfmash mappings to scale across a whole cluster. It is recommended to set this to the number of available nodes. If only one machine is available, leave it at 1.",
    ),
    optional(
        "wfmash_only",
        ParamType::Bool,
        None,
        None,
        "If this parameter is set, only the wfmash alignment step of the pipeline is executed. This option is offered for users who want to run wfmash on a cluster.",
    ),
    optional(
        "wfmash_hg_filter_ani_diff",
        ParamType::Int,
        Some(ParamValue::Int(30)),
        None,
        "Filter out mappings unlikely to be this Average Nucleotide Identity (ANI) less than the best mapping.",
    ),
    optional(
        "wfmash_n_mappings",
        ParamType::Int,
        None,
        None,
        "Number of mappings for each segment. [default: `n_haplotypes - 1`].",
    ),
    optional(
        "seqwish_min_match_length",
        ParamType::Int,
        Some(ParamValue::Int(23)),
        Some("Seqwish Options"),
        "Ignores exact matches below this length.",
    ),
    optional(
        "seqwish_transclose_batch",
        ParamType::Str,
        text("10000000"),
        None,
        "Number of base pairs to use for transitive closure batch.",
    ),
    optional(
        "seqwish_sparse_factor",
        ParamType::Float,
        Some(ParamValue::Float(0.0)),
        None,
        "Keep this randomly selected fraction of input matches.",
    ),
    optional(
        "seqwish_paf",
        ParamType::Str,
        None,
        None,
        "Input PAF file. The wfmash alignment step is skipped.",
    ),
    optional(
        "skip_smoothxg",
        ParamType::Bool,
        None,
        Some("Smoothxg options"),
        "Skip the graph smoothing step of the pipeline.",
    ),
    optional(
        "smoothxg_poa_length",
        ParamType::Str,
        text("700,900,1100"),
        None,
        "Maximum sequence length to put into POA. Is a comma-separated list. For each integer, SMOOTHXG will be executed once.",
    ),
    optional(
        "smoothxg_pad_max_depth",
        ParamType::Int,
        Some(ParamValue::Int(100)),
        None,
        "Path depth at which we don't pad the POA problem.",
    ),
    optional(
        "smoothxg_poa_padding",
        ParamType::Float,
        Some(ParamValue::Float(0.001)),
        None,
        "Pad each end of each sequence in POA with 'smoothxg_poa_padding * longest_poa_seq' base pairs.",
    ),
    optional(
        "smoothxg_poa_params",
        ParamType::Str,
        text("1,19,39,3,81,1"),
        None,
        "Score parameters for POA in the form of 'match,mismatch,gap1,ext1,gap2,ext2'. It may also be given as presets: 'asm5', 'asm10', 'asm15', 'asm20'. [default: 1,19,39,3,81,1 = asm5].",
    ),
    optional(
        "smoothxg_write_maf",
        ParamType::Bool,
        None,
        None,
        "Write MAF output representing merged POA blocks.",
    ),
    optional(
        "smoothxg_run_abpoa",
        ParamType::Bool,
        None,
        None,
        "Run abPOA. [default: SPOA].",
    ),
    optional(
        "smoothxg_run_global_poa",
        ParamType::Bool,
        None,
        None,
        "Run the POA in global mode. [default: local mode].",
    ),
    optional(
        "smoothxg_poa_cpus",
        ParamType::Int,
        Some(ParamValue::Int(0)),
        None,
        "Number of CPUs for the potentially very memory expensive POA phase of SMOOTHXG. Default is 'task.cpus'.",
    ),
    optional(
        "vcf_spec",
        ParamType::Str,
        None,
        Some("Vg Deconstruct Options"),
        "Specify a set of VCFs to produce with `--vcf_spec \"REF[:LEN][,REF[:LEN]]*\"`.",
    ),
    optional(
        "communities",
        ParamType::Bool,
        None,
        Some("Community"),
        "Enable community detection.",
    ),
    optional(
        "multiqc_methods_description",
        ParamType::Str,
        None,
        Some("Generic options"),
        "Custom MultiQC yaml file containing HTML including a methods description.",
    ),
];

pub fn parameters() -> &'static [Parameter] {
    &PARAMETERS
}

pub fn find(name: &str) -> Option<&'static Parameter> {
    PARAMETERS.iter().find(|p| p.name == name)
}

pub fn lookup(name: &str) -> Result<&'static Parameter> {
    find(name).ok_or_else(|| LaunchError::UnknownParameter {
        name: name.to_string(),
    })
}

/// Checks the table itself: unique keys, defaults matching their declared
/// type, and no defaults on required parameters.
pub fn check_table(table: &[Parameter]) -> Result<()> {
    let mut seen = HashSet::new();
    for param in table {
        if !seen.insert(param.name) {
            return Err(LaunchError::ConfigValidationError {
                field: param.name.to_string(),
                message: "parameter declared twice".to_string(),
            });
        }
        if let Some(default) = &param.default {
            if param.required {
                return Err(LaunchError::ConfigValidationError {
                    field: param.name.to_string(),
                    message: "required parameter declares a default".to_string(),
                });
            }
            if !param.ty.accepts(default) {
                return Err(LaunchError::InvalidConfigValueError {
                    field: param.name.to_string(),
                    value: default.to_arg(),
                    reason: format!("default does not match declared type {}", param.ty),
                });
            }
        }
    }
    Ok(())
}

/// JSON array of every declared parameter, in table order.
pub fn to_json() -> Result<String> {
    Ok(serde_json::to_string_pretty(parameters())?)
}
