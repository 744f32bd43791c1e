// SPDX: CC0-1.0

use anyhow::Context;
use chrono::{DateTime, Local};
use core::num::NonZeroU16;
use parametric_surface::{
    eval::{self, EvalErr, EvalErrTyp, Idents},
    field::{self, FieldErrTyp, RawInput},
    parse::{self, ParseErr},
    shell::{self, Command},
    stdlib,
    surface::{self, Surface, SurfaceExprs},
    Domain,
};
#[cfg(not(debug_assertions))]
use std::process::Stdio;
use std::{
    fs::OpenOptions,
    io::{stdout, BufWriter, Write},
    process::{self, Child, ExitCode},
    sync::Arc,
};

const OUTPUT_RES: [u32; 2] = [1920, 1080];

fn output_svg_filename(now: DateTime<Local>) -> String {
    format!(
        "{}_output-{}.{}",
        env!("CARGO_PKG_NAME"),
        now.format("%Y-%m-%d_%H-%M-%S"),
        "svg"
    )
}

fn output_gnuplot_filename(now: DateTime<Local>) -> String {
    format!(
        "{}_output-{}.{}",
        env!("CARGO_PKG_NAME"),
        now.format("%Y-%m-%d_%H-%M-%S"),
        "gnuplot"
    )
}

fn output_data_filename(now: DateTime<Local>) -> String {
    format!(
        "{}_output-{}.{}",
        env!("CARGO_PKG_NAME"),
        now.format("%Y-%m-%d_%H-%M-%S"),
        "data"
    )
}

fn main() -> ExitCode {
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("unexpected error: {err}");
            let chain = err.chain();
            if chain.len() > 1 {
                eprintln!();
                eprintln!("context:");
                for it in chain.skip(1) {
                    eprintln!("  {it}");
                }
            }
            ExitCode::FAILURE
        }
    }
}

#[derive(Debug)]
struct State {
    input: RawInput,
    resolution: NonZeroU16,
    idents: Idents,
    gnuplot: Option<Child>,
}

fn try_main() -> anyhow::Result<()> {
    let mut state = State {
        // start out on the unit sphere
        input: RawInput {
            u_start: String::from("0"),
            u_end: String::from("2*pi"),
            v_start: String::from("0"),
            v_end: String::from("pi"),
            x_eq: String::from("cos(u)*sin(v)"),
            y_eq: String::from("sin(u)*sin(v)"),
            z_eq: String::from("cos(v)"),
        },
        resolution: Domain::DEFAULT_RESOLUTION.try_into().unwrap(),
        idents: stdlib::standard_idents(),
        gnuplot: None,
    };

    let mut stdout = BufWriter::new(stdout());
    loop {
        writeln!(
            stdout,
            "x = {x}   y = {y}   z = {z}",
            x = state.input.x_eq,
            y = state.input.y_eq,
            z = state.input.z_eq,
        )?;

        let mut try_cmd = shell::input(&mut stdout, "> ")?;
        try_cmd.make_ascii_lowercase();
        writeln!(stdout)?;

        if let Ok(cmd) = try_cmd.parse::<Command>() {
            match cmd {
                Command::Help => {
                    for c in Command::exhaustive() {
                        writeln!(stdout, "{name}: {help}", name = c.name(), help = c.help())?;
                    }
                }

                Command::Quit => break,

                Command::SetRange => set_range(&mut stdout, &mut state)?,

                Command::SetEquations => set_equations(&mut stdout, &mut state)?,

                Command::Show => show(&mut stdout, &state)?,

                Command::DumpAst => dump_ast(&mut stdout, &state)?,

                Command::Plot => plot_surface(&mut stdout, &mut state)?,
            }
        } else {
            writeln!(stdout, r#"Unknown command, try "help" for help"#)?;
        }

        writeln!(stdout)?;
    }
    stdout.flush()?;
    Ok(())
}

fn set_range<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    writeln!(out, "note: leave blank to skip")?;
    writeln!(out, "note: endpoints may be expressions, like 2*pi")?;

    for (name, dst) in [
        ("u start", &mut state.input.u_start),
        ("u end", &mut state.input.u_end),
        ("v start", &mut state.input.v_start),
        ("v end", &mut state.input.v_end),
    ] {
        let new = shell::input(&mut out, format_args!("?{name} (is {dst}) = "))?;
        if !new.is_empty() {
            *dst = new;
        }
    }

    writeln!(
        out,
        "note: resolution must be a nonzero integer, at most {}",
        Domain::MAX_RESOLUTION
    )?;
    match shell::read_fromstr::<_, NonZeroU16>(
        &mut out,
        format_args!("?resolution (is {cur}) = ", cur = state.resolution),
        true,
    )? {
        Ok(Some(new)) if new.get() <= Domain::MAX_RESOLUTION => state.resolution = new,
        Ok(Some(new)) => writeln!(
            out,
            "error: resolution {new} is above the maximum of {}",
            Domain::MAX_RESOLUTION
        )?,
        Ok(None) => {}
        Err(_) => {}
    }

    Ok(())
}

fn set_equations<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    writeln!(out, "note: leave blank to skip")?;

    for (name, dst) in [
        ("x(u, v)", &mut state.input.x_eq),
        ("y(u, v)", &mut state.input.y_eq),
        ("z(u, v)", &mut state.input.z_eq),
    ] {
        let new = shell::input(&mut out, format_args!("{name} = "))?;
        if !new.is_empty() {
            *dst = new;
        }
    }

    Ok(())
}

fn show<W: Write>(mut out: W, state: &State) -> anyhow::Result<()> {
    let input = &state.input;
    writeln!(out, "u range: {} .. {}", input.u_start, input.u_end)?;
    writeln!(out, "v range: {} .. {}", input.v_start, input.v_end)?;
    writeln!(out, "resolution: {}", state.resolution)?;
    writeln!(out, "x(u, v) = {}", input.x_eq)?;
    writeln!(out, "y(u, v) = {}", input.y_eq)?;
    writeln!(out, "z(u, v) = {}", input.z_eq)?;
    Ok(())
}

fn dump_ast<W: Write>(mut out: W, state: &State) -> anyhow::Result<()> {
    for (name, text) in [
        ("x equation", &state.input.x_eq),
        ("y equation", &state.input.y_eq),
        ("z equation", &state.input.z_eq),
    ] {
        match parse::parse(&Arc::new(text.clone())) {
            Ok(expr) => shell::dump_expr(&mut out, &expr, format_args!("{name}"))?,
            Err(err) => {
                writeln!(out, "{name} does not compile:")?;
                report_parse(&mut out, &err)?;
            }
        }
    }
    Ok(())
}

fn report_parse<W: Write>(mut out: W, err: &ParseErr) -> anyhow::Result<()> {
    shell::underline(&mut out, &err.loc)?;
    writeln!(out, "parse error: {}", err.typ)?;
    if let Some(hint) = err.hint() {
        writeln!(out, "note: {hint}")?;
    }
    Ok(())
}

fn report_eval<W: Write>(mut out: W, err: &EvalErr, idents: &Idents) -> anyhow::Result<()> {
    shell::underline(&mut out, &err.loc)?;
    writeln!(out, "evaluation error: {err}")?;

    if let EvalErrTyp::UndefinedIdent = err.typ {
        if let Some((key, ident)) = eval::nearest(err.loc.get(), idents) {
            writeln!(out, "note: {} '{key}' has a similar name", ident.describe())?;
        }
    }
    Ok(())
}

fn plot_surface<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    // all four range fields first; every failure is reported before aborting
    let req = match field::validate(&state.input, &state.idents, state.resolution) {
        Ok(req) => req,
        Err(err) => {
            for failure in &err.failures {
                writeln!(out, "{failure}")?;
                match &failure.typ {
                    FieldErrTyp::Parse(parse_err) => report_parse(&mut out, parse_err)?,
                    FieldErrTyp::Eval(eval_err) => {
                        report_eval(&mut out, eval_err, &state.idents)?
                    }
                    FieldErrTyp::Empty
                    | FieldErrTyp::NonFinite(_)
                    | FieldErrTyp::Resolution(_) => {}
                }
            }
            writeln!(out, "error: {err}")?;
            return Ok(());
        }
    };

    let exprs = match SurfaceExprs::compile(&req.x_eq, &req.y_eq, &req.z_eq) {
        Ok(exprs) => exprs,
        Err(err) => {
            writeln!(out, "error: {err}")?;
            report_parse(&mut out, &err.err)?;
            return Ok(());
        }
    };

    let surface = match surface::sample(&exprs, &mut state.idents, &req.domain) {
        Ok(surface) => surface,
        Err(err) => {
            writeln!(out, "error: {err}")?;
            report_eval(&mut out, &err.err, &state.idents)?;
            return Ok(());
        }
    };

    writeln!(out, "evaluation ok")?;
    render(&mut out, state, &surface)
}

fn render<W: Write>(mut out: W, state: &mut State, surface: &Surface) -> anyhow::Result<()> {
    // a previous plot window still around would hold its files open
    if let Some(mut old_child) = state.gnuplot.take() {
        old_child
            .kill()
            .context("failed to kill previous gnuplot child")?;
    }

    let now = Local::now();
    let data_path = output_data_filename(now);
    let gnuplot_path = output_gnuplot_filename(now);
    let svg_path = output_svg_filename(now);

    let mut data = BufWriter::new(
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&data_path)
            .context("failed to open output data file")?,
    );
    let mut gnuplot = BufWriter::new(
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&gnuplot_path)
            .context("failed to open output gnuplot file")?,
    );

    // one scan line per grid row, blank-line separated, as splot expects
    for row in 0..surface.rows() {
        for col in 0..surface.cols() {
            writeln!(
                data,
                "{x} {y} {z}",
                x = surface.x.at(row, col),
                y = surface.y.at(row, col),
                z = surface.z.at(row, col),
            )
            .context("failed to write to output data file")?;
        }
        writeln!(data).context("failed to write to output data file")?;
    }
    data.flush()?;
    data.get_mut().sync_data()?;
    drop(data);

    writeln!(gnuplot, "reset")?;
    writeln!(gnuplot, "set term push")?;
    let [width, height] = OUTPUT_RES;
    writeln!(gnuplot, "set terminal svg size {width},{height} enhanced")?;
    writeln!(gnuplot, "set output '{svg_path}'")?;

    writeln!(gnuplot, r#"set title "{data_path}""#)?;
    writeln!(gnuplot, "set title noenhanced")?;

    writeln!(gnuplot, r#"set xlabel "X""#)?;
    writeln!(gnuplot, r#"set ylabel "Y""#)?;
    writeln!(gnuplot, r#"set zlabel "Z""#)?;
    writeln!(gnuplot, "set tics out nomirror")?;

    writeln!(gnuplot, "set pm3d depthorder")?;
    writeln!(gnuplot, "set palette rgbformulae 34,35,36")?;
    writeln!(gnuplot, "unset key")?;

    writeln!(gnuplot, r#"splot '{data_path}' with pm3d notitle"#)?;

    // display window
    writeln!(gnuplot, "set term pop")?;
    writeln!(gnuplot, "replot")?;

    gnuplot.flush()?;
    gnuplot.get_mut().sync_data()?;
    drop(gnuplot);

    let mut cmd = process::Command::new("gnuplot");
    cmd.arg("--persist").arg(&gnuplot_path);
    #[cfg(not(debug_assertions))]
    {
        cmd.stdout(Stdio::null())
            .stderr(Stdio::null())
            .stdin(Stdio::null());
    }
    let child = cmd
        .spawn()
        .context("failed to spawn gnuplot (is it installed and in ${{PATH}}?)")?;

    state.gnuplot = Some(child);
    writeln!(out, "wrote {data_path} and {gnuplot_path}")?;
    Ok(())
}
