//! Header-bound column projection for loosely-typed tabular rows.
//!
//! Columns are located by name in the first (header) row, never by position.
//! The resulting [`ColumnBinding`] is then applied unchanged to every data row.

/// Declared column: name plus whether the header must contain it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub required: bool,
}

impl ColumnSpec {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
        }
    }

    /// Parse compact notation: `NAME` is required, `NAME?` is optional.
    pub fn parse(spec: &str) -> Self {
        match spec.strip_suffix('?') {
            Some(name) => Self::optional(name),
            None => Self::required(spec),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Required column not present in the header
    MissingColumn { name: String },
    /// Required column matches more than one header cell
    AmbiguousColumn { name: String, positions: Vec<usize> },
    /// Data row has no cell at a bound position
    RowTooShort {
        column: String,
        index: usize,
        len: usize,
    },
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingColumn { name } => write!(f, "missing required column '{name}'"),
            Self::AmbiguousColumn { name, positions } => {
                write!(f, "column '{name}' is ambiguous (matches positions {positions:?})")
            }
            Self::RowTooShort { column, index, len } => write!(
                f,
                "row has {len} cells, column '{column}' is bound to position {index}"
            ),
        }
    }
}

impl std::error::Error for SchemaError {}

/// Per-column source positions, fixed for one ingestion run.
///
/// `slots[i]` is the header position of `specs[i]`, or `None` for an
/// optional column the header lacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBinding {
    names: Vec<String>,
    slots: Vec<Option<usize>>,
}

impl ColumnBinding {
    /// Number of bound slots (always the number of declared columns).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Header position for the column at `slot`.
    pub fn position(&self, slot: usize) -> Option<usize> {
        self.slots.get(slot).copied().flatten()
    }

    /// Project a data row into declared column order.
    ///
    /// Cells are returned verbatim; absent optional columns yield `None`.
    pub fn project<S: AsRef<str>>(
        &self,
        row: &[S],
    ) -> Result<Vec<Option<String>>, SchemaError> {
        self.slots
            .iter()
            .zip(&self.names)
            .map(|(slot, name)| match *slot {
                None => Ok(None),
                Some(index) => row
                    .get(index)
                    .map(|cell| Some(cell.as_ref().to_string()))
                    .ok_or_else(|| SchemaError::RowTooShort {
                        column: name.clone(),
                        index,
                        len: row.len(),
                    }),
            })
            .collect()
    }
}

/// Bind declared columns to header positions.
///
/// Names compare case-insensitively and exactly (no trimming). An optional
/// column matching several header cells binds to the leftmost one.
pub fn bind<S: AsRef<str>>(
    header: &[S],
    specs: &[ColumnSpec],
) -> Result<ColumnBinding, SchemaError> {
    let mut slots = Vec::with_capacity(specs.len());

    for spec in specs {
        let positions: Vec<usize> = header
            .iter()
            .enumerate()
            .filter(|(_, cell)| eq_ignore_case(cell.as_ref(), &spec.name))
            .map(|(i, _)| i)
            .collect();

        let slot = match positions.as_slice() {
            [] if spec.required => {
                return Err(SchemaError::MissingColumn {
                    name: spec.name.clone(),
                });
            }
            [] => None,
            [single] => Some(*single),
            [first, ..] if !spec.required => {
                log::debug!(
                    "Optional column '{}' matches positions {positions:?}, using {first}",
                    spec.name
                );
                Some(*first)
            }
            _ => {
                return Err(SchemaError::AmbiguousColumn {
                    name: spec.name.clone(),
                    positions: positions.clone(),
                });
            }
        };
        slots.push(slot);
    }

    Ok(ColumnBinding {
        names: specs.iter().map(|s| s.name.clone()).collect(),
        slots,
    })
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Single forward pass over rows: the first row is bound as header, the
/// rest are projected.
///
/// A header error is yielded once, after which the iterator is exhausted.
pub struct BoundRows<I> {
    rows: I,
    specs: Vec<ColumnSpec>,
    binding: Option<ColumnBinding>,
    failed: bool,
}

impl<I> BoundRows<I> {
    pub fn new(rows: I, specs: Vec<ColumnSpec>) -> Self {
        Self {
            rows,
            specs,
            binding: None,
            failed: false,
        }
    }

    /// Binding computed from the header, once the first row was consumed.
    pub fn binding(&self) -> Option<&ColumnBinding> {
        self.binding.as_ref()
    }
}

impl<I, R> Iterator for BoundRows<I>
where
    I: Iterator<Item = R>,
    R: AsRef<[String]>,
{
    type Item = Result<Vec<Option<String>>, SchemaError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        if self.binding.is_none() {
            let header = self.rows.next()?;
            match bind(header.as_ref(), &self.specs) {
                Ok(binding) => self.binding = Some(binding),
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }

        let row = self.rows.next()?;
        let binding = self.binding.as_ref()?;
        Some(binding.project(row.as_ref()))
    }
}
