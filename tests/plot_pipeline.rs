// SPDX: CC0-1.0

//! The full plot action without the shell: validate the text fields,
//! compile the equations, sample the surface.

use core::num::NonZeroU16;
use parametric_surface::{
    field::{self, FieldErrTyp, PlotRequest, RawInput},
    stdlib,
    surface::{self, Surface, SurfaceExprs},
    Domain,
};

fn resolution() -> NonZeroU16 {
    NonZeroU16::new(Domain::DEFAULT_RESOLUTION).unwrap()
}

fn raw(
    u_start: &str,
    u_end: &str,
    v_start: &str,
    v_end: &str,
    x_eq: &str,
    y_eq: &str,
    z_eq: &str,
) -> RawInput {
    RawInput {
        u_start: u_start.into(),
        u_end: u_end.into(),
        v_start: v_start.into(),
        v_end: v_end.into(),
        x_eq: x_eq.into(),
        y_eq: y_eq.into(),
        z_eq: z_eq.into(),
    }
}

fn plot(input: &RawInput) -> Result<Surface, String> {
    let mut idents = stdlib::standard_idents();
    let req: PlotRequest =
        field::validate(input, &idents, resolution()).map_err(|err| err.to_string())?;
    let exprs = SurfaceExprs::compile(&req.x_eq, &req.y_eq, &req.z_eq)
        .map_err(|err| err.to_string())?;
    surface::sample(&exprs, &mut idents, &req.domain).map_err(|err| err.to_string())
}

#[test]
fn flat_unit_square() {
    let surface = plot(&raw("0", "1", "0", "1", "u", "v", "0")).unwrap();

    assert_eq!(surface.rows(), 100);
    assert_eq!(surface.cols(), 100);
    assert_eq!(surface.x, surface.grid.u);
    assert_eq!(surface.y, surface.grid.v);
    assert!(surface.z.iter().all(|z| z == 0.0));

    // the four corners of the unit square
    assert_eq!((surface.x.at(0, 0), surface.y.at(0, 0)), (0.0, 0.0));
    assert_eq!((surface.x.at(0, 99), surface.y.at(0, 99)), (1.0, 0.0));
    assert_eq!((surface.x.at(99, 0), surface.y.at(99, 0)), (0.0, 1.0));
    assert_eq!((surface.x.at(99, 99), surface.y.at(99, 99)), (1.0, 1.0));
}

#[test]
fn unit_sphere() {
    let surface = plot(&raw(
        "0",
        "2*pi",
        "0",
        "pi",
        "cos(u)*sin(v)",
        "sin(u)*sin(v)",
        "cos(v)",
    ))
    .unwrap();

    for row in 0..surface.rows() {
        for col in 0..surface.cols() {
            let x = surface.x.at(row, col);
            let y = surface.y.at(row, col);
            let z = surface.z.at(row, col);
            let norm = x * x + y * y + z * z;
            assert!((norm - 1.0).abs() < 1e-9, "({row}, {col}): {norm}");
        }
    }
}

#[test]
fn undefined_name_aborts_the_whole_plot() {
    let err = plot(&raw("0", "1", "0", "1", "u", "bogus(u)", "0")).unwrap_err();
    assert!(err.contains("undefined identifier 'bogus'"), "{err}");
    assert!(err.contains("Y equation"), "{err}");
}

#[test]
fn blank_range_field_aborts_before_any_grid() {
    let idents = stdlib::standard_idents();
    let input = raw("", "1", "0", "1", "u", "v", "0");
    let err = field::validate(&input, &idents, resolution()).unwrap_err();
    assert_eq!(err.failures.len(), 1);
    assert_eq!(err.failures[0].field, "u_start");
    assert!(matches!(err.failures[0].typ, FieldErrTyp::Empty));
}

#[test]
fn injection_attempts_fail_safely() {
    for eq in ["os.system('x')", "__import__('os')", "eval(u)", "open(v)"] {
        let err = plot(&raw("0", "1", "0", "1", eq, "v", "0")).unwrap_err();
        assert!(err.contains("X equation"), "{eq}: {err}");
    }
}

#[test]
fn range_endpoint_expressions_and_reversed_ranges() {
    // reversed u range: the sample sequence simply runs backwards
    let surface = plot(&raw("1", "0", "0", "1", "u", "v", "u*v")).unwrap();
    assert_eq!(surface.x.at(0, 0), 1.0);
    assert_eq!(surface.x.at(0, 99), 0.0);
}

#[test]
fn tube_with_expression_endpoints() {
    let surface = plot(&raw(
        "0",
        "2*pi",
        "-1",
        "1",
        "cos(u)",
        "sin(u)",
        "v",
    ))
    .unwrap();
    for row in 0..surface.rows() {
        for col in 0..surface.cols() {
            let x = surface.x.at(row, col);
            let y = surface.y.at(row, col);
            assert!((x * x + y * y - 1.0).abs() < 1e-9);
        }
    }
    assert_eq!(surface.z.at(0, 0), -1.0);
    assert_eq!(surface.z.at(99, 0), 1.0);
}

#[test]
fn scientific_notation_endpoints() {
    let idents = stdlib::standard_idents();
    assert_eq!(field::scalar("u_start", "1e5", &idents).unwrap(), 100000.0);
    assert_eq!(field::scalar("v_end", "2.5e-1", &idents).unwrap(), 0.25);

    let surface = plot(&raw("0", "1e2", "0", "1", "u", "v", "0")).unwrap();
    assert_eq!(surface.x.at(0, 99), 100.0);
}

#[test]
fn non_finite_samples_are_not_errors() {
    // ln(0) at the corner is -inf; the plot still succeeds
    let surface = plot(&raw("0", "1", "0", "1", "u", "v", "ln(u)")).unwrap();
    assert!(surface.z.at(0, 0).is_infinite());
}

#[test]
fn failing_axis_is_named() {
    let err = plot(&raw("0", "1", "0", "1", "u", "v", "sin(u, v)")).unwrap_err();
    assert!(err.contains("Z equation"), "{err}");
    assert!(err.contains("takes 1 argument"), "{err}");
}
