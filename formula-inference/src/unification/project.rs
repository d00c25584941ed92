//! As part of the binding table algebra, we must restructure rows by
//! removing or re-ordering variables, and applying the same
//! transformation to individual rows (lists of entities).
use super::Variable;
use crate::error::{InferenceError, Result};
use crate::ground::{Entity, Row};

/// A Projection takes a single row (with shape `input`), and returns
/// a row of shape `output`.
pub struct Projection {
    input: Vec<Variable>,
    output: Vec<Variable>,
    fun: Box<dyn Fn(&Row) -> Row>,
}

impl Projection {
    /// Returns a Projection from `inp` into `out`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `out` refers to a variable absent from `inp`.
    pub fn new(inp: &[Variable], out: &[Variable]) -> Result<Projection> {
        make_projection(inp, out)
    }

    #[cfg(not(tarpaulin_include))]
    #[must_use]
    pub fn input(&self) -> &[Variable] {
        &self.input
    }

    #[cfg(not(tarpaulin_include))]
    #[must_use]
    pub fn output(&self) -> &[Variable] {
        &self.output
    }

    #[inline]
    #[must_use]
    pub fn apply(&self, input: &Row) -> Row {
        (self.fun)(input)
    }
}

fn mismatch(inp: &[Variable], out: &[Variable]) -> InferenceError {
    InferenceError::ColumnMismatch {
        left: inp.to_vec(),
        right: out.to_vec(),
    }
}

fn make_projection(inp: &[Variable], out: &[Variable]) -> Result<Projection> {
    // The `indices` vector tells us where to find each output value
    // in the input row: the first value is the index of the first
    // output, second value that of the second output, etc.
    let mut indices = Vec::<usize>::with_capacity(out.len());
    for needle in out.iter() {
        let index = inp
            .iter()
            .position(|haystack| haystack == needle)
            .ok_or_else(|| mismatch(inp, out))?;
        indices.push(index);
    }

    let expected_input_len = inp.len();
    let projector = move |row: &Row| {
        let entities = row.entities();

        assert_eq!(entities.len(), expected_input_len);
        Row::from_vec(indices.iter().map(|index| entities[*index]).collect())
    };

    Ok(Projection {
        input: inp.into(),
        output: out.into(),
        fun: Box::new(projector),
    })
}

/// A MultiProjection projects a single row from any number of rows.
/// This operation converts a pair (or arbitrary tuple) of rows into a
/// single row, after joining them on a common projected key.
pub struct MultiProjection {
    inputs: Vec<Box<[Variable]>>,
    output: Vec<Variable>,
    fun: Box<dyn Fn(&[&Row]) -> Row>,
}

impl MultiProjection {
    /// Returns a MultiProjection from `inp`s into `out`.
    ///
    /// The MultiProjection does not check that the input rows agree on
    /// variables they have in common; the caller is responsible for
    /// enforcing that relationship, e.g., by joining rows on their
    /// common columns.  Each output variable is read from the first
    /// input that has it.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `out` refers to a variable absent from all
    /// `inp`s.
    pub fn new(inp: &[Box<[Variable]>], out: &[Variable]) -> Result<MultiProjection> {
        make_multi_projection(inp, out)
    }

    #[cfg(not(tarpaulin_include))]
    #[must_use]
    pub fn inputs(&self) -> &[Box<[Variable]>] {
        &self.inputs
    }

    #[cfg(not(tarpaulin_include))]
    #[must_use]
    pub fn output(&self) -> &[Variable] {
        &self.output
    }

    #[inline]
    #[must_use]
    pub fn apply(&self, input: &[&Row]) -> Row {
        (self.fun)(input)
    }

    #[inline]
    #[must_use]
    pub fn from_pair(&self, x: &Row, y: &Row) -> Row {
        self.apply(&[x, y])
    }
}

fn make_multi_projection(inp: &[Box<[Variable]>], out: &[Variable]) -> Result<MultiProjection> {
    // Given an output variable, finds out which input and where in
    // that input the corresponding value may be found.
    let find_indices = |needle: &Variable| {
        for (input_id, input) in inp.iter().enumerate() {
            if let Some(index) = input.iter().position(|haystack| haystack == needle) {
                return Ok((input_id, index));
            }
        }

        Err(InferenceError::ColumnMismatch {
            left: inp.iter().flat_map(|input| input.iter().cloned()).collect(),
            right: out.to_vec(),
        })
    };

    // Each value is a pair of index in the list of input, and index
    // in that input.  The first value is the index of the first
    // output, second value that of the second output, etc.
    let mut indices = Vec::<(usize, usize)>::with_capacity(out.len());
    for needle in out.iter() {
        indices.push(find_indices(needle)?);
    }

    let expected_input_len = inp.len();
    let projector = move |rows: &[&Row]| {
        assert_eq!(rows.len(), expected_input_len);
        Row::from_vec(
            indices
                .iter()
                .map(|(input_id, index)| rows[*input_id].entities()[*index])
                .collect::<Vec<Entity>>(),
        )
    };

    Ok(MultiProjection {
        inputs: inp.into(),
        output: out.into(),
        fun: Box::new(projector),
    })
}

#[test]
fn test_project_happy_path() {
    let x = Variable::new("x");
    let y = Variable::new("y");
    let z = Variable::new("z");
    let input = vec![x.clone(), y.clone(), z.clone()];
    let output = vec![z, y];

    let projection = Projection::new(&input, &output).expect("ok");
    assert_eq!(projection.input(), input);
    assert_eq!(projection.output(), output);
    assert_eq!(
        projection.apply(&[Entity::new(1), Entity::new(2), Entity::new(3)].into()),
        vec![Entity::new(3), Entity::new(2)].into()
    );

    // Apply the projection multiple times.
    assert_eq!(
        projection.apply(&[Entity::new(2), Entity::new(3), Entity::new(4)].into()),
        vec![Entity::new(4), Entity::new(3)].into()
    );
}

#[test]
fn test_project_missing_variable() {
    let x = Variable::new("x");
    let y = Variable::new("y");
    let z = Variable::new("z");
    let input = vec![x, y.clone()];
    let output = vec![z, y];

    assert!(matches!(
        Projection::new(&input, &output),
        Err(InferenceError::ColumnMismatch { .. })
    ));
}

#[test]
fn test_project_to_unit() {
    let x = Variable::new("x");
    let projection = Projection::new(&[x], &[]).expect("ok");

    assert_eq!(projection.apply(&[Entity::new(1)].into()), Row::unit());
}

#[test]
fn test_multi_project_happy_path() {
    let x = Variable::new("x");
    let y = Variable::new("y");
    let z = Variable::new("z");
    let inputs = vec![
        vec![x.clone(), y.clone()].into_boxed_slice(),
        vec![y.clone(), z.clone()].into_boxed_slice(),
    ];
    let output = vec![z, y, x];

    let projection = MultiProjection::new(&inputs, &output).expect("ok");
    assert_eq!(projection.inputs(), inputs);
    assert_eq!(projection.output(), output);

    assert_eq!(
        projection.apply(&[
            &[Entity::new(1), Entity::new(2)].into(),
            &[Entity::new(2), Entity::new(3)].into()
        ]),
        vec![Entity::new(3), Entity::new(2), Entity::new(1)].into()
    );
    assert_eq!(
        projection.from_pair(
            &[Entity::new(3), Entity::new(2)].into(),
            &[Entity::new(2), Entity::new(1)].into(),
        ),
        vec![Entity::new(1), Entity::new(2), Entity::new(3)].into()
    );
}

#[test]
fn test_multi_project_missing_variable() {
    let x = Variable::new("x");
    let y = Variable::new("y");
    let z = Variable::new("z");
    let inputs = vec![
        vec![x.clone(), y.clone()].into_boxed_slice(),
        vec![y.clone(), x.clone()].into_boxed_slice(),
    ];
    let output = vec![z, y, x];

    assert!(MultiProjection::new(&inputs, &output).is_err());
}
