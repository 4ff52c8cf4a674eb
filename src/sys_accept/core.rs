//! Accept-Encoding parsing and preference ranking. No Hyper types here.

/// Something that can tell which content coding the client prefers.
pub trait EncodingPreference {
    /// The client's top choice among `candidates`, or `None` when it
    /// accepts none of them.
    fn preferred<'a>(&self, candidates: &[&'a str]) -> Option<&'a str>;
}

#[derive(Debug, Clone, PartialEq)]
struct EncodingSpec {
    encoding: String,
    q: f32,
    order: usize,
}

/// How well one candidate matched the header.
#[derive(Debug, Clone, Copy)]
struct Priority {
    q: f32,
    specificity: u8,
    order: usize,
    index: usize,
}

/// A parsed `Accept-Encoding` header.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptEncoding {
    specs: Vec<EncodingSpec>,
}

impl AcceptEncoding {
    /// Parse a header value. A missing header accepts only `identity`.
    pub fn parse(header: Option<&str>) -> Self {
        let mut specs = Vec::new();
        let mut has_identity = false;
        let mut min_quality = 1.0f32;

        for (order, part) in header.unwrap_or("").split(',').enumerate() {
            let Some(spec) = parse_spec(part, order) else {
                continue;
            };
            has_identity = has_identity || spec.encoding == "*" || spec.encoding == "identity";
            if spec.q > 0.0 {
                min_quality = min_quality.min(spec.q);
            }
            specs.push(spec);
        }

        if !has_identity {
            // identity stays acceptable unless refused, at the lowest listed quality
            let order = specs.len();
            specs.push(EncodingSpec {
                encoding: "identity".to_string(),
                q: min_quality,
                order,
            });
        }

        Self { specs }
    }

    fn priority(&self, candidate: &str, index: usize) -> Priority {
        let mut best = Priority {
            q: 0.0,
            specificity: 0,
            order: usize::MAX,
            index,
        };
        let mut matched = false;

        for spec in &self.specs {
            let specificity = if spec.encoding.eq_ignore_ascii_case(candidate) {
                1
            } else if spec.encoding == "*" {
                0
            } else {
                continue;
            };

            let better = !matched
                || specificity > best.specificity
                || (specificity == best.specificity && spec.q > best.q)
                || (specificity == best.specificity && spec.q == best.q && spec.order < best.order);
            if better {
                best = Priority {
                    q: spec.q,
                    specificity,
                    order: spec.order,
                    index,
                };
                matched = true;
            }
        }
        best
    }
}

impl EncodingPreference for AcceptEncoding {
    fn preferred<'a>(&self, candidates: &[&'a str]) -> Option<&'a str> {
        let mut ranked: Vec<Priority> = candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| self.priority(candidate, index))
            .filter(|priority| priority.q > 0.0)
            .collect();

        ranked.sort_by(|a, b| {
            b.q.total_cmp(&a.q)
                .then(b.specificity.cmp(&a.specificity))
                .then(a.order.cmp(&b.order))
                .then(a.index.cmp(&b.index))
        });

        ranked.first().map(|priority| candidates[priority.index])
    }
}

fn parse_spec(part: &str, order: usize) -> Option<EncodingSpec> {
    let mut pieces = part.split(';');
    let encoding = pieces.next()?.trim();
    if encoding.is_empty() || !encoding.bytes().all(is_token_byte) {
        return None;
    }

    let mut q = 1.0f32;
    for param in pieces {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        if key.trim().eq_ignore_ascii_case("q") {
            q = value.trim().parse::<f32>().ok().filter(|q| q.is_finite())?;
        }
    }

    Some(EncodingSpec {
        encoding: encoding.to_ascii_lowercase(),
        q: q.clamp(0.0, 1.0),
        order,
    })
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}
