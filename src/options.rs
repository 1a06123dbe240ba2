/// The option record a caller builds up before a repair, or before opening
/// a stream. Owned by the caller; read-only once a repair or stream begins
/// using it.
///
/// Every field has a matching setter; `Options` itself stays a flat `Copy`
/// struct (no builder type, no `Default` trait object) with plain
/// constructor-argument-style setters rather than a fluent builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub ensure_ascii: bool,
    pub allow_python_keywords: bool,
    pub tolerate_hash_comments: bool,
    pub fenced_code_blocks: bool,
    pub repair_undefined: bool,
    pub normalize_js_nonfinite: bool,
    pub number_tolerance_leading_dot: bool,
    pub number_tolerance_trailing_dot: bool,
    pub python_style_separators: bool,
    pub aggressive_truncation_fix: bool,
    pub stream_ndjson_aggregate: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            ensure_ascii: false,
            allow_python_keywords: false,
            tolerate_hash_comments: false,
            fenced_code_blocks: false,
            repair_undefined: false,
            normalize_js_nonfinite: false,
            number_tolerance_leading_dot: false,
            number_tolerance_trailing_dot: false,
            python_style_separators: false,
            aggressive_truncation_fix: false,
            stream_ndjson_aggregate: false,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ensure_ascii(&mut self, value: bool) -> &mut Self {
        self.ensure_ascii = value;
        self
    }
    pub fn set_allow_python_keywords(&mut self, value: bool) -> &mut Self {
        self.allow_python_keywords = value;
        self
    }
    pub fn set_tolerate_hash_comments(&mut self, value: bool) -> &mut Self {
        self.tolerate_hash_comments = value;
        self
    }
    pub fn set_fenced_code_blocks(&mut self, value: bool) -> &mut Self {
        self.fenced_code_blocks = value;
        self
    }
    pub fn set_repair_undefined(&mut self, value: bool) -> &mut Self {
        self.repair_undefined = value;
        self
    }
    pub fn set_normalize_js_nonfinite(&mut self, value: bool) -> &mut Self {
        self.normalize_js_nonfinite = value;
        self
    }
    pub fn set_number_tolerance_leading_dot(&mut self, value: bool) -> &mut Self {
        self.number_tolerance_leading_dot = value;
        self
    }
    pub fn set_number_tolerance_trailing_dot(&mut self, value: bool) -> &mut Self {
        self.number_tolerance_trailing_dot = value;
        self
    }
    pub fn set_python_style_separators(&mut self, value: bool) -> &mut Self {
        self.python_style_separators = value;
        self
    }
    pub fn set_aggressive_truncation_fix(&mut self, value: bool) -> &mut Self {
        self.aggressive_truncation_fix = value;
        self
    }
    pub fn set_stream_ndjson_aggregate(&mut self, value: bool) -> &mut Self {
        self.stream_ndjson_aggregate = value;
        self
    }
}
