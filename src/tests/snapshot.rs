/// Helper macro to snapshot a synthesized policy or template.
/// Goes through `serde_json::Value` so the snapshot shows exactly what a
/// template would embed, intrinsic functions included.
#[macro_export]
macro_rules! snapshot_template {
    ($value:expr, @$snapshot:literal) => {{
        let value = serde_json::to_value(&$value).unwrap();
        insta::assert_json_snapshot!(value, @$snapshot);
    }};
}
