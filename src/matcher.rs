use std::collections::{HashMap, HashSet, VecDeque};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

use crate::capture::Capturable;
use crate::errors::UsageError;
use crate::registry::{FieldId, OptionRegistry};

/// The capture handle bound to each registered field.
pub(crate) type CaptureTable<'a> = HashMap<FieldId, Box<dyn Capturable + 'a>>;

/// One pass of the tokenizing state machine over a raw argument vector.
///
/// The matcher scans tokens against a sealed registry until the literal `--`
/// (or the end of the vector); every remaining token after `--` is positional.
/// Matched options drive their capture handles immediately, so a failure
/// part-way leaves earlier captures applied (best-effort, not transactional).
pub(crate) struct ArgMatcher<'r> {
    registry: &'r OptionRegistry,
    positionals: Vec<String>,
    seen: HashSet<FieldId>,
}

impl<'r> ArgMatcher<'r> {
    pub(crate) fn new(registry: &'r OptionRegistry) -> Self {
        Self {
            registry,
            positionals: Vec::default(),
            seen: HashSet::default(),
        }
    }

    /// Consume the whole argument vector: scan options, then run the
    /// end-of-scan phase (required check, positional count check, positional
    /// binding).
    pub(crate) fn run(
        &mut self,
        args: Vec<String>,
        captures: &mut CaptureTable<'_>,
    ) -> Result<(), UsageError> {
        let mut queue: VecDeque<String> = args.into();
        self.scan(&mut queue, captures)?;
        // Everything still queued when the scan stopped is positional.
        self.positionals.extend(queue);
        self.check_required()?;
        self.bind_params(captures)?;
        Ok(())
    }

    /// The positional tokens accumulated so far, also available after a
    /// failed run.
    pub(crate) fn into_positionals(self) -> Vec<String> {
        self.positionals
    }

    fn scan(
        &mut self,
        queue: &mut VecDeque<String>,
        captures: &mut CaptureTable<'_>,
    ) -> Result<(), UsageError> {
        while let Some(token) = queue.pop_front() {
            if token == "--" {
                #[cfg(feature = "tracing_debug")]
                debug!("end-of-options marker reached; {} token(s) left.", queue.len());
                break;
            }
            if let Some(name) = token.strip_prefix("--") {
                self.match_long(name, queue, captures)?;
            } else if let Some(name) = token.strip_prefix('-') {
                self.match_short(name, queue, captures)?;
            } else {
                #[cfg(feature = "tracing_debug")]
                debug!("token '{token}' is positional.");
                self.positionals.push(token);
            }
        }
        Ok(())
    }

    fn match_long(
        &mut self,
        name: &str,
        queue: &mut VecDeque<String>,
        captures: &mut CaptureTable<'_>,
    ) -> Result<(), UsageError> {
        let field = self.registry.field_by_long_name(name)?;
        self.consume(field, name, queue, captures)
    }

    fn match_short(
        &mut self,
        name: &str,
        queue: &mut VecDeque<String>,
        captures: &mut CaptureTable<'_>,
    ) -> Result<(), UsageError> {
        if name.is_empty() {
            return Err(UsageError::EmptyOption);
        }
        let mut chars = name.chars();
        chars.next();
        let single_character = chars.next().is_none();

        // An exact short-name match always wins over merge-splitting.
        if single_character || self.registry.has_short_name(name) {
            let field = self.registry.field_by_short_name(name)?;
            return self.consume(field, name, queue, captures);
        }
        if !self.registry.merges_short_names() {
            return Err(UsageError::UnknownOption(name.to_string()));
        }
        // Merged short names resolve against an empty queue: an option inside
        // a merge group cannot consume argument tokens.
        let mut empty = VecDeque::new();
        for c in name.chars() {
            let single = c.to_string();
            let result = self
                .registry
                .field_by_short_name(&single)
                .and_then(|field| self.consume(field, &single, &mut empty, captures));
            result.map_err(|source| UsageError::UnknownShortGroup {
                source: Box::new(source),
                group: name.to_string(),
            })?;
        }
        Ok(())
    }

    fn consume(
        &mut self,
        field: FieldId,
        name: &str,
        queue: &mut VecDeque<String>,
        captures: &mut CaptureTable<'_>,
    ) -> Result<(), UsageError> {
        let multiplicity = self.registry.arg_multiplicity(field);
        let mut tokens = Vec::with_capacity(multiplicity);
        for _ in 0..multiplicity {
            let token = queue.pop_front().ok_or_else(|| UsageError::NotEnoughTokens {
                option: name.to_string(),
                expected: multiplicity,
            })?;
            tokens.push(token);
        }
        #[cfg(feature = "tracing_debug")]
        debug!("option '{name}' matched with {} argument token(s).", tokens.len());
        let capture = captures
            .get_mut(&field)
            .expect("internal error - every registered field holds a capture");
        capture.matched();
        for token in &tokens {
            capture.capture(token)?;
        }
        self.seen.insert(field);
        Ok(())
    }

    fn check_required(&self) -> Result<(), UsageError> {
        let missing: Vec<String> = self
            .registry
            .required_fields()
            .into_iter()
            .filter(|field| !self.seen.contains(field))
            .map(|field| {
                self.registry
                    .field_to_string(field)
                    .expect("internal error - required fields are named after sealing")
            })
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(UsageError::MissingRequired {
                rendered: missing.join(", "),
            })
        }
    }

    fn bind_params(&self, captures: &mut CaptureTable<'_>) -> Result<(), UsageError> {
        let provided = self.positionals.len();
        let multiplicity = self.registry.param_multiplicity();
        if !multiplicity.contains(provided) {
            return Err(UsageError::WrongParameterCount {
                provided,
                expected: multiplicity.to_human_readable(),
            });
        }
        // Excess positional tokens beyond the declared slots stay unbound but
        // remain retrievable; empty slots are skipped.
        for index in 0..provided.min(self.registry.n_params()) {
            if let Some(field) = self.registry.param_field(index) {
                let capture = captures
                    .get_mut(&field)
                    .expect("internal error - every registered field holds a capture");
                capture.matched();
                capture.capture(&self.positionals[index])?;
            }
        }
        Ok(())
    }
}
