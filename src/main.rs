use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use lpp::{basic_feasible_solutions, Constraint, Method, OptDir, Problem, Solver, Status, Symbol};

#[derive(Parser)]
#[command(name = "lpp")]
#[command(about = "Exact-rational linear programming on built-in sample problems", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a sample problem and print every optimal solution
    Solve {
        #[arg(value_enum)]
        sample: Sample,
        #[arg(short, long, value_enum, default_value_t = MethodArg::Simplex)]
        method: MethodArg,
        /// Print every intermediate tableau
        #[arg(short, long)]
        verbose: bool,
    },
    /// Build and solve the dual of a sample problem
    Dual {
        #[arg(value_enum)]
        sample: Sample,
        /// Name prefix of the dual variables
        #[arg(short, long, default_value = "w")]
        prefix: String,
    },
    /// Ranges of the objective coefficients and right-hand sides at the optimum
    Sensitivity {
        #[arg(value_enum)]
        sample: Sample,
    },
    /// Basic solutions of x1 + 2x2 + x3 = 4, 2x1 + x2 + 5x3 = 5
    Bfs,
    /// List the sample problems
    List,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum MethodArg {
    Simplex,
    Dual,
}

impl From<MethodArg> for Method {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Simplex => Method::Simplex,
            MethodArg::Dual => Method::Dual,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Sample {
    Production,
    BigM,
    Unbounded,
    Alternate,
    Diet,
}

impl Sample {
    const ALL: [Sample; 5] = [
        Sample::Production,
        Sample::BigM,
        Sample::Unbounded,
        Sample::Alternate,
        Sample::Diet,
    ];

    fn name(self) -> &'static str {
        match self {
            Sample::Production => "production",
            Sample::BigM => "big-m",
            Sample::Unbounded => "unbounded",
            Sample::Alternate => "alternate",
            Sample::Diet => "diet",
        }
    }

    fn problem(self) -> Result<Problem, lpp::LppError> {
        match self {
            Sample::Production => {
                let (x, y) = (Symbol::new("x")?, Symbol::new("y")?);
                Problem::new(
                    OptDir::Max,
                    3 * &x + 2 * &y,
                    vec![Constraint::le(&x + &y, 4), Constraint::le(&x - &y, 2)],
                    vec![],
                )
            }
            Sample::BigM => {
                let (x1, x2) = (Symbol::new("x1")?, Symbol::new("x2")?);
                Problem::new(
                    OptDir::Max,
                    -4 * &x1 - &x2,
                    vec![
                        Constraint::equals(3 * &x1 + &x2, 3),
                        Constraint::ge(4 * &x1 + 3 * &x2, 6),
                        Constraint::le(&x1 + 2 * &x2, 3),
                    ],
                    vec![],
                )
            }
            Sample::Unbounded => {
                let (x, y) = (Symbol::new("x")?, Symbol::new("y")?);
                Problem::new(
                    OptDir::Max,
                    2 * &x + &y,
                    vec![Constraint::le(&x - &y, 10), Constraint::le(2 * &x - &y, 40)],
                    vec![],
                )
            }
            Sample::Alternate => {
                let (x, y) = (Symbol::new("x")?, Symbol::new("y")?);
                Problem::new(
                    OptDir::Max,
                    2 * &x + 4 * &y,
                    vec![Constraint::le(&x + 2 * &y, 5), Constraint::le(&x + &y, 4)],
                    vec![],
                )
            }
            Sample::Diet => {
                let (x1, x2) = (Symbol::new("x1")?, Symbol::new("x2")?);
                Problem::new(
                    OptDir::Min,
                    3 * &x1 + 2 * &x2,
                    vec![
                        Constraint::ge(3 * &x1 + &x2, 3),
                        Constraint::ge(4 * &x1 + 3 * &x2, 6),
                        Constraint::le(&x1 + &x2, 3),
                    ],
                    vec![],
                )
            }
        }
    }
}

fn heading(text: &str) {
    println!("{}", text.bold().underline());
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{}", message.to_string().red());
    std::process::exit(1);
}

fn load(sample: Sample) -> Problem {
    sample.problem().unwrap_or_else(|e| fail(e))
}

fn solve(sample: Sample, method: Method, verbose: bool) {
    let problem = load(sample);
    heading("problem");
    println!("{}", problem);

    let solver = Solver::new().with_method(method).with_trace(verbose);
    let mut tableau = solver.tableau(&problem);
    let result = tableau.solutions(method);
    if verbose {
        heading(&format!("{} iterations", method));
        for step in tableau.trace() {
            println!("{}", step);
        }
    }
    match result {
        Ok(solutions) => {
            if solutions.len() > 1 {
                heading(&format!("{} alternate optima", solutions.len()));
            } else {
                heading("optimum");
            }
            for solution in solutions {
                println!("{}", solution.to_string().green());
            }
        }
        Err(e) => println!("{}", e.to_string().yellow()),
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            sample,
            method,
            verbose,
        } => solve(sample, method.into(), verbose),
        Commands::Dual { sample, prefix } => {
            let problem = load(sample);
            let dual = problem.dual(&prefix).unwrap_or_else(|e| fail(e));
            heading("primal");
            println!("{}", problem);
            heading("dual");
            println!("{}", dual);
            for (label, p) in [("primal", &problem), ("dual", &dual)] {
                match p.optimize() {
                    Ok(solution) => println!("{}: {}", label, solution.to_string().green()),
                    Err(e) => println!("{}: {}", label, e.to_string().yellow()),
                }
            }
        }
        Commands::Sensitivity { sample } => {
            let problem = load(sample);
            let mut tableau = Solver::new().tableau(&problem);
            match tableau.sensitivity() {
                Ok(sensitivity) => {
                    heading("optimal tableau");
                    println!("{}", tableau);
                    if tableau.status() == Status::Alternate {
                        println!("{}", "the optimum is not unique".yellow());
                    }
                    heading("ranges");
                    print!("{}", sensitivity);
                }
                Err(e) => println!("{}", e.to_string().yellow()),
            }
        }
        Commands::Bfs => {
            let names = ["x1", "x2", "x3"];
            let symbols: Vec<Symbol> = names
                .iter()
                .map(|n| Symbol::new(*n).unwrap_or_else(|e| fail(e)))
                .collect();
            let (x1, x2, x3) = (&symbols[0], &symbols[1], &symbols[2]);
            let equations = vec![
                Constraint::equals(x1 + 2 * x2 + x3, 4),
                Constraint::equals(2 * x1 + x2 + 5 * x3, 5),
            ];
            for equation in &equations {
                println!("{}", equation);
            }
            heading("basic solutions");
            match basic_feasible_solutions(&equations) {
                Ok(solutions) => {
                    for solution in solutions {
                        let text = solution.to_string();
                        if solution.is_feasible() {
                            println!("{}", text.green());
                        } else {
                            println!("{} {}", text, "(infeasible)".dimmed());
                        }
                    }
                }
                Err(e) => fail(e),
            }
        }
        Commands::List => {
            for sample in Sample::ALL {
                heading(sample.name());
                match sample.problem() {
                    Ok(problem) => println!("{}", problem),
                    Err(e) => fail(e),
                }
            }
        }
    }
}
