use std::{env, fs, process};

use tracing_subscriber::EnvFilter;
use xlang::{
    Heap, HostValue, Lambda, NativeArgs, ParamSpec, RuntimeConfig, Value, contract_from_params,
    bytecode::{bytecode::Bytecode, compiler::compile_source, constant::Constant, op_code::disassemble},
    frontend::{lexer::Lexer, token_type::TokenType},
};

fn main() {
    let mut args: Vec<String> = env::args().collect();
    let trace = args.iter().any(|arg| arg == "--trace");
    let no_gc = args.iter().any(|arg| arg == "--no-gc");
    let leak_detector = args.iter().any(|arg| arg == "--leak-detector");
    args.retain(|arg| arg != "--trace" && arg != "--no-gc" && arg != "--leak-detector");

    let Some(config_path) = extract_value(&mut args, "--config") else {
        process::exit(2);
    };
    let Some(gc_threshold) = extract_gc_threshold(&mut args) else {
        process::exit(2);
    };
    let Some(script_args) = extract_script_args(&mut args) else {
        process::exit(2);
    };

    init_logging(trace);

    if args.len() < 2 {
        print_help();
        return;
    }

    let mut config = match config_path {
        Some(path) => match load_config(&path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Error: {}", err);
                process::exit(2);
            }
        },
        None => RuntimeConfig::default(),
    };
    if trace {
        config.trace = true;
    }
    if no_gc {
        config.auto_collect = false;
    }
    if let Some(threshold) = gc_threshold {
        config.gc_threshold = threshold;
    }

    let status = match args[1].as_str() {
        "-h" | "--help" | "help" => {
            print_help();
            0
        }
        "run" => match args.get(2) {
            Some(path) => run_file(path, config, &script_args),
            None => {
                eprintln!("Usage: xlang run <file.xl>");
                2
            }
        },
        "tokens" => match args.get(2) {
            Some(path) => show_tokens(path),
            None => {
                eprintln!("Usage: xlang tokens <file.xl>");
                2
            }
        },
        "bytecode" => match args.get(2) {
            Some(path) => show_bytecode(path),
            None => {
                eprintln!("Usage: xlang bytecode <file.xl>");
                2
            }
        },
        path => run_file(path, config, &script_args),
    };

    if leak_detector {
        print_leak_stats();
    }
    process::exit(status);
}

fn init_logging(trace: bool) {
    let filter = if trace {
        EnvFilter::new("trace")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_help() {
    println!(
        "\
XLang CLI

Usage:
  xlang <file.xl>
  xlang run <file.xl>
  xlang tokens <file.xl>
  xlang bytecode <file.xl>

Flags:
  --config <file.json>   Load runtime settings from a JSON file
  --trace                Log every executed instruction
  --no-gc                Disable automatic collection
  --gc-threshold <n>     Allocations between automatic collections
  --arg NAME=JSON        Pass a keyword argument (can be repeated)
  --leak-detector        Print allocation stats after the run
  -h, --help             Show this help message

The script sees a `print` function and every --arg as bindings.
"
    );
}

fn run_file(path: &str, config: RuntimeConfig, script_args: &[(String, serde_json::Value)]) -> i32 {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Error reading {}: {}", path, err);
            return 2;
        }
    };

    let heap = Heap::with_config(config);
    match run_source(&heap, &source, script_args) {
        Ok(result) => {
            if !result.is_null() {
                println!("{}", result.repr());
            }
            0
        }
        Err(err) => {
            eprintln!("{}", err);
            1
        }
    }
}

fn run_source(
    heap: &Heap,
    source: &str,
    script_args: &[(String, serde_json::Value)],
) -> xlang::Result<Value> {
    let print = heap.wrap_function(
        "print",
        print_values,
        &contract_from_params(heap, &[ParamSpec::var_positional("values")])?,
    )?;
    let defaults = heap.new_tuple(&[heap.new_named("print", &print)?])?;

    let lambda = Lambda::new(heap);
    lambda.load(source, &defaults, None)?;

    let kwargs = script_args
        .iter()
        .map(|(name, json)| Ok((name.as_str(), heap.from_json(json)?)))
        .collect::<xlang::Result<Vec<_>>>()?;
    let kwargs: Vec<(&str, &Value)> = kwargs.iter().map(|(name, value)| (*name, value)).collect();
    lambda.call(&kwargs)
}

fn print_values(_heap: &Heap, args: NativeArgs) -> Result<HostValue, String> {
    let line = args
        .raw()
        .rest
        .iter()
        .map(|value| value.as_string().unwrap_or_else(|| value.repr()))
        .collect::<Vec<_>>()
        .join(" ");
    println!("{}", line);
    Ok(HostValue::Null)
}

fn show_tokens(path: &str) -> i32 {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Error reading {}: {}", path, err);
            return 2;
        }
    };
    let mut lexer = Lexer::new(source);
    loop {
        let token = lexer.next_token();
        println!("{}", token);
        if token.token_type == TokenType::Eof {
            break;
        }
    }
    0
}

fn show_bytecode(path: &str) -> i32 {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Error reading {}: {}", path, err);
            return 2;
        }
    };
    match compile_source(&source) {
        Ok(program) => {
            print_program("<main>", &program);
            0
        }
        Err(diagnostics) => {
            eprintln!("{}", diagnostics);
            1
        }
    }
}

fn print_program(name: &str, program: &Bytecode) {
    println!("== {} ==", name);
    if !program.required.is_empty() {
        println!("required: {}", program.required.join(", "));
    }
    print!("{}", disassemble(&program.instructions));
    for (index, constant) in program.constants.iter().enumerate() {
        if let Constant::Function(function) = constant {
            println!();
            print_program(&format!("{}/fn#{}", name, index), function);
        }
    }
}

fn print_leak_stats() {
    let stats = xlang::runtime::leak_detector::snapshot();
    eprintln!(
        "leak-detector: allocations={} eager_frees={} swept={} collections={} outstanding={}",
        stats.allocations,
        stats.eager_frees,
        stats.swept,
        stats.collections,
        stats.outstanding()
    );
}

fn load_config(path: &str) -> Result<RuntimeConfig, String> {
    let text = fs::read_to_string(path).map_err(|err| format!("reading {}: {}", path, err))?;
    RuntimeConfig::from_json_str(&text).map_err(|err| format!("parsing {}: {}", path, err))
}

/// Removes `flag <value>` from `args`. `None` means a usage error was printed.
fn extract_value(args: &mut Vec<String>, flag: &str) -> Option<Option<String>> {
    let mut value = None;
    let mut i = 0;
    while i < args.len() {
        if args[i] == flag {
            if i + 1 >= args.len() {
                eprintln!("Usage: xlang <file.xl> {} <value>", flag);
                return None;
            }
            value = Some(args.remove(i + 1));
            args.remove(i);
            continue;
        }
        i += 1;
    }
    Some(value)
}

fn extract_gc_threshold(args: &mut Vec<String>) -> Option<Option<usize>> {
    let value = extract_value(args, "--gc-threshold")?;
    match value.map(|v| v.parse::<usize>()) {
        None => Some(None),
        Some(Ok(parsed)) => Some(Some(parsed)),
        Some(Err(_)) => {
            eprintln!("Error: --gc-threshold expects a non-negative integer.");
            None
        }
    }
}

fn extract_script_args(args: &mut Vec<String>) -> Option<Vec<(String, serde_json::Value)>> {
    let mut parsed = Vec::new();
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--arg" {
            if i + 1 >= args.len() {
                eprintln!("Usage: xlang <file.xl> --arg NAME=JSON");
                return None;
            }
            let raw = args.remove(i + 1);
            args.remove(i);
            let Some((name, json)) = raw.split_once('=') else {
                eprintln!("Error: --arg expects NAME=JSON, got `{}`", raw);
                return None;
            };
            match serde_json::from_str(json) {
                Ok(value) => parsed.push((name.to_string(), value)),
                Err(err) => {
                    eprintln!("Error: --arg {}: {}", name, err);
                    return None;
                }
            }
            continue;
        }
        i += 1;
    }
    Some(parsed)
}
