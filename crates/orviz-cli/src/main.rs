use clap::{Parser, Subcommand, ValueEnum};
use orviz_lang::Compiler;
use orviz_solver::{
    LpSolution, PenaltyLine, Problem, Solution, SolverConfig, TransportationSolution, TspMethod, TspSolution,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "orviz")]
#[command(about = "Solve small operations research problems step by step", long_about = None)]
struct Cli {
    /// Log filter, e.g. `debug` or `orviz_solver=trace` (overrides ORVIZ_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a single expression and show how it was read
    Parse {
        /// The expression to parse
        expr: String,
        /// Read the input as a constraint (`lhs <= rhs`)
        #[arg(short, long, conflicts_with = "objective")]
        constraint: bool,
        /// Read the input as an objective (`min: ...`)
        #[arg(short, long)]
        objective: bool,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
    },
    /// Check a JSON request for errors without solving it
    Check {
        /// The request file
        file: PathBuf,
    },
    /// Solve a JSON request
    Solve {
        /// The request file
        file: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
        /// Tolerance for floating point comparisons
        #[arg(long)]
        tolerance: Option<f64>,
        /// Largest TSP instance solved exactly
        #[arg(long)]
        exact_threshold: Option<usize>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Pretty,
    Json,
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_env("ORVIZ_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    match cli.command {
        Commands::Parse {
            expr,
            constraint,
            objective,
            format,
        } => {
            let result = if constraint {
                orviz_lang::Parser::parse_constraint(&expr).map(|c| render(&c, format))
            } else if objective {
                orviz_lang::Parser::parse_objective(&expr).map(|o| render(&o, format))
            } else {
                orviz_lang::Parser::parse_expression(&expr).map(|e| render(&e, format))
            };

            match result {
                Ok(output) => println!("{}", output),
                Err(e) => {
                    eprintln!("Parse error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Check { file } => {
            let compiler = Compiler::new();
            let checked = compiler
                .load_file(&file)
                .and_then(|request| compiler.compile(&request).map(|problem| (request, problem)));

            match checked {
                Ok((request, problem)) => {
                    println!("✓ {} is valid", file.display());
                    println!("  type: {}", request.kind());
                    print_problem_summary(&problem);
                }
                Err(e) => {
                    eprintln!("✗ {} has errors:", file.display());
                    eprintln!("  {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Solve {
            file,
            format,
            tolerance,
            exact_threshold,
        } => {
            let mut config = SolverConfig::default();
            if let Some(tol) = tolerance {
                config = config.with_tolerance(tol);
            }
            if let Some(cities) = exact_threshold {
                config = config.with_exact_threshold(cities);
            }

            let compiler = Compiler::new().with_tolerance(config.tolerance);
            let request = match compiler.load_file(&file) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("Error reading request: {}", e);
                    std::process::exit(1);
                }
            };

            let problem = match compiler.compile(&request) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Compile error: {}", e);
                    std::process::exit(1);
                }
            };

            let solution = match orviz_solver::solve(&problem, &config) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Solve error: {}", e);
                    std::process::exit(1);
                }
            };

            if format == Format::Json {
                println!("{}", to_json(&solution));
                return;
            }

            match (&problem, &solution) {
                (Problem::Lp(lp), Solution::Lp(s)) => print_lp(&lp.variables, s),
                (Problem::Transportation(_), Solution::Transportation(s)) => print_transportation(s),
                (Problem::Tsp(tsp), Solution::Tsp(s)) => print_tsp(&tsp.cities, s),
                _ => {
                    eprintln!("Solver returned a solution of the wrong kind");
                    std::process::exit(1);
                }
            }
        }
    }
}

fn render<T: Serialize + std::fmt::Display>(value: &T, format: Format) -> String {
    match format {
        Format::Pretty => value.to_string(),
        Format::Json => to_json(value),
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    match serde_json::to_string_pretty(value) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_problem_summary(problem: &Problem) {
    match problem {
        Problem::Lp(lp) => {
            println!("  objective: {} {:?}", lp.objective.direction, lp.objective.coefficients);
            println!("  {} constraints", lp.num_constraints());
        }
        Problem::Transportation(t) => {
            println!("  {} sources, {} destinations", t.num_sources(), t.num_destinations());
            println!("  total supply {} = total demand {}", t.total_supply(), t.total_demand());
        }
        Problem::Tsp(t) => {
            println!("  {} cities", t.num_cities());
            println!("  {}", t.cities.join(", "));
        }
    }
}

fn print_lp(variables: &[String], solution: &LpSolution) {
    println!("Status: OPTIMAL");
    println!(
        "Optimum: {} = {:.4}, {} = {:.4}",
        variables[0], solution.optimum.x1, variables[1], solution.optimum.x2
    );
    println!("Objective value: {:.4}", solution.objective_value);
    println!();

    println!("Corner points:");
    for point in &solution.corner_points {
        let lines = &solution.lines;
        println!(
            "  ({:8.4}, {:8.4})  z = {:10.4}  {:10}  [{} / {}]",
            point.x1,
            point.x2,
            point.value,
            if point.feasible { "feasible" } else { "infeasible" },
            lines[point.lines.0].label,
            lines[point.lines.1].label,
        );
    }

    if !solution.binding_constraints.is_empty() {
        println!();
        println!("Binding constraints:");
        for name in &solution.binding_constraints {
            println!("  - {}", name);
        }
    }

    if solution.has_multiple_optima() {
        println!();
        println!("Alternate optima:");
        for point in &solution.alternate_optima {
            println!("  ({:.4}, {:.4})", point.x1, point.x2);
        }
    }
}

fn print_transportation(solution: &TransportationSolution) {
    println!("Steps:");
    for (k, step) in solution.steps.iter().enumerate() {
        let line = match step.selected {
            PenaltyLine::Row(i) => format!("row {}", i + 1),
            PenaltyLine::Column(j) => format!("column {}", j + 1),
        };
        let note = if step.degenerate { "  (degenerate)" } else { "" };
        println!(
            "  {:3}. {:10} penalty {:8.2}  ship {:8.2} to ({}, {}) at {:.2}  running cost {:.2}{}",
            k + 1,
            line,
            step.penalty,
            step.quantity,
            step.row + 1,
            step.column + 1,
            step.unit_cost,
            step.running_cost,
            note,
        );
    }
    println!();

    println!("Allocation:");
    for row in &solution.allocation {
        let cells: Vec<String> = row.iter().map(|q| format!("{:8.2}", q)).collect();
        println!("  {}", cells.join(" "));
    }
    println!();
    println!("Total cost: {:.2}", solution.total_cost);
}

fn print_tsp(cities: &[String], solution: &TspSolution) {
    let label = |i: usize| cities.get(i).map(String::as_str).unwrap_or("?");
    let route: Vec<&str> = solution.tour.order.iter().map(|&i| label(i)).collect();

    println!("Tour: {}", route.join(" -> "));
    println!("Length: {:.2}", solution.tour.length);
    println!(
        "Method: {}",
        match solution.method {
            TspMethod::Exact => "exact",
            TspMethod::NearestNeighbor => "nearest neighbor",
        }
    );
    println!();
    for edge in &solution.edges {
        println!("  {:>12} -> {:<12} {:10.2}", label(edge.from), label(edge.to), edge.distance);
    }
}
