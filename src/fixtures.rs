#[cfg(test)]
pub mod test {
    use crate::config::Config;

    /// Two sections with the same option names and one value of each kind
    /// the coercer distinguishes.
    pub const SAMPLE_YAML: &str = "\
aaa:
  float: 4.4
  int: 4
  list_int: [1, 2]
  list_str: [aaa, bbb]
bbb:
  float: 8.4
  int: 7
  list_int: [3, 4]
  list_str: [bbb, ccc]
";

    pub fn sample() -> Config {
        let mut config = Config::new();
        config
            .load(SAMPLE_YAML)
            .expect("sample document should load");
        config
    }
}
