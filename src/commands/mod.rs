pub mod shell_commands;
