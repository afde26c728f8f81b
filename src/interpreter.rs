use tracing::{debug, trace};

use crate::{
    diagnostics::Diagnostics,
    environment::{EnvRef, Environment},
    error::RuntimeError,
    syntax::{
        expr::{self, Expr},
        stmt::{self, Stmt},
        token::{Literal, Token, TokenType},
    },
    utils::logger::{Logger, StdoutLogger},
    value::Value,
};

type RuntimeResult<T> = Result<T, RuntimeError>;

pub struct Interpreter {
    globals: EnvRef,
    environment: EnvRef,
    logger: Box<dyn Logger>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}

impl Interpreter {
    pub fn new() -> Interpreter {
        Interpreter::with_logger(Box::new(StdoutLogger))
    }

    pub fn with_logger(logger: Box<dyn Logger>) -> Interpreter {
        let globals = Environment::new_global();
        Interpreter {
            environment: globals.clone(),
            globals,
            logger,
        }
    }

    /// Runs `statements` in order against the global scope. The first
    /// runtime error is reported and the remaining statements are skipped.
    pub fn interpret(&mut self, statements: &[Stmt], diagnostics: &mut Diagnostics) {
        for statement in statements {
            if let Err(error) = self.execute(statement) {
                debug!(line = error.token.line, "runtime error, aborting run");
                diagnostics.runtime_error(&error);
                return;
            }
        }
    }

    /// Evaluates a single expression and returns its value, for REPL echo.
    pub fn evaluate_expression(
        &mut self,
        expr: &Expr,
        diagnostics: &mut Diagnostics,
    ) -> Option<Value> {
        match self.evaluate(expr) {
            Ok(value) => Some(value),
            Err(error) => {
                diagnostics.runtime_error(&error);
                None
            }
        }
    }

    /// Writes a value through the output sink using the display rules.
    pub fn echo(&mut self, value: &Value) {
        self.logger.print(format_args!("{value}"));
    }

    pub fn globals(&self) -> &EnvRef {
        &self.globals
    }

    fn evaluate(&mut self, expr: &Expr) -> RuntimeResult<Value> {
        expr::Visitor::visit_expr(self, expr)
    }

    fn execute(&mut self, stmt: &Stmt) -> RuntimeResult<()> {
        stmt::Visitor::visit_stmt(self, stmt)
    }

    /// Runs `statements` in `environment`, then restores the previous scope
    /// whether or not a statement failed.
    fn execute_block(&mut self, statements: &[Stmt], environment: EnvRef) -> RuntimeResult<()> {
        let previous = std::mem::replace(&mut self.environment, environment);
        trace!(statements = statements.len(), "entering block scope");

        let result = statements
            .iter()
            .try_for_each(|statement| self.execute(statement));

        self.environment = previous;
        trace!(ok = result.is_ok(), "left block scope");
        result
    }

    fn visit_expr_stmt(&mut self, expr: &Expr) -> RuntimeResult<()> {
        self.evaluate(expr).map(|_| ())
    }

    fn visit_print_stmt(&mut self, expr: &Expr) -> RuntimeResult<()> {
        let value = self.evaluate(expr)?;
        self.echo(&value);
        Ok(())
    }

    fn visit_var_stmt(&mut self, name: &Token, initializer: &Option<Expr>) -> RuntimeResult<()> {
        let value = match initializer {
            Some(expr) => self.evaluate(expr)?,
            None => Value::Nil,
        };

        self.environment
            .borrow_mut()
            .define(name.lexeme.clone(), value);
        Ok(())
    }

    fn visit_assign_expr(&mut self, name: &Token, value: &Expr) -> RuntimeResult<Value> {
        let value = self.evaluate(value)?;
        self.environment.borrow_mut().assign(name, value.clone())?;
        Ok(value)
    }

    fn visit_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> RuntimeResult<Value> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        match operator.token_type {
            // arithmetic
            TokenType::Plus => match (left, right) {
                (Value::Number(left), Value::Number(right)) => Ok(Value::Number(left + right)),
                (Value::String(mut left), Value::String(right)) => {
                    left.push_str(&right);
                    Ok(Value::String(left))
                }
                _ => Err(RuntimeError::new(
                    operator,
                    "Operands must be two numbers or two strings.",
                )),
            },
            TokenType::Minus => {
                let (left, right) = number_operands(operator, &left, &right)?;
                Ok(Value::Number(left - right))
            }
            TokenType::Star => {
                let (left, right) = number_operands(operator, &left, &right)?;
                Ok(Value::Number(left * right))
            }
            TokenType::Slash => {
                let (left, right) = number_operands(operator, &left, &right)?;
                if right == 0.0 {
                    return Err(RuntimeError::new(operator, "Division by zero."));
                }
                Ok(Value::Number(left / right))
            }

            // comparison
            TokenType::Greater => {
                let (left, right) = number_operands(operator, &left, &right)?;
                Ok(Value::Boolean(left > right))
            }
            TokenType::GreaterEqual => {
                let (left, right) = number_operands(operator, &left, &right)?;
                Ok(Value::Boolean(left >= right))
            }
            TokenType::Less => {
                let (left, right) = number_operands(operator, &left, &right)?;
                Ok(Value::Boolean(left < right))
            }
            TokenType::LessEqual => {
                let (left, right) = number_operands(operator, &left, &right)?;
                Ok(Value::Boolean(left <= right))
            }

            // equality
            TokenType::BangEqual => Ok(Value::Boolean(!left.is_equal(&right))),
            TokenType::EqualEqual => Ok(Value::Boolean(left.is_equal(&right))),

            _ => Err(RuntimeError::new(
                operator,
                format!("Unknown binary operator '{}'.", operator.lexeme),
            )),
        }
    }

    fn visit_literal(&self, literal: &Literal) -> Value {
        Value::from(literal)
    }

    fn visit_unary(&mut self, operator: &Token, right: &Expr) -> RuntimeResult<Value> {
        let right = self.evaluate(right)?;

        match operator.token_type {
            TokenType::Minus => match right {
                Value::Number(value) => Ok(Value::Number(-value)),
                _ => Err(RuntimeError::new(operator, "Operand must be a number.")),
            },
            TokenType::Bang => Ok(Value::Boolean(!right.is_truthy())),
            _ => Err(RuntimeError::new(
                operator,
                format!("Unknown unary operator '{}'.", operator.lexeme),
            )),
        }
    }

    fn visit_var_expr(&self, name: &Token) -> RuntimeResult<Value> {
        self.environment.borrow().get(name)
    }
}

fn number_operands(operator: &Token, left: &Value, right: &Value) -> RuntimeResult<(f64, f64)> {
    match (left, right) {
        (Value::Number(left), Value::Number(right)) => Ok((*left, *right)),
        _ => Err(RuntimeError::new(operator, "Operands must be numbers.")),
    }
}

impl expr::Visitor<RuntimeResult<Value>> for Interpreter {
    fn visit_expr(&mut self, expr: &Expr) -> RuntimeResult<Value> {
        match expr {
            Expr::Binary {
                left,
                operator,
                right,
            } => self.visit_binary(left, operator, right),
            Expr::Grouping { expression } => self.evaluate(expression),
            Expr::Literal { value } => Ok(self.visit_literal(value)),
            Expr::Unary { operator, right } => self.visit_unary(operator, right),
            Expr::Variable { name } => self.visit_var_expr(name),
            Expr::Assign { name, value } => self.visit_assign_expr(name, value),
        }
    }
}

impl stmt::Visitor<RuntimeResult<()>> for Interpreter {
    fn visit_stmt(&mut self, stmt: &Stmt) -> RuntimeResult<()> {
        trace!(?stmt, "executing");
        match stmt {
            Stmt::Expression(expr) => self.visit_expr_stmt(expr),
            Stmt::Print(expr) => self.visit_print_stmt(expr),
            Stmt::Var { name, initializer } => self.visit_var_stmt(name, initializer),
            Stmt::Block(statements) => {
                let local_env = Environment::new_local(&self.environment);
                self.execute_block(statements, local_env)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::utils::logger::MemoryLogger;

    fn ident(name: &str, line: usize) -> Token {
        Token::new(TokenType::Identifier, name, Literal::None, line)
    }

    fn op(token_type: TokenType, lexeme: &str) -> Token {
        Token::new(token_type, lexeme, Literal::None, 1)
    }

    fn number(value: f64) -> Expr {
        Expr::Literal {
            value: Literal::Number(value),
        }
    }

    fn string(value: &str) -> Expr {
        Expr::Literal {
            value: Literal::String(value.to_string()),
        }
    }

    fn binary(left: Expr, operator: Token, right: Expr) -> Expr {
        Expr::Binary {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }
    }

    fn var(name: &str, value: Expr) -> Stmt {
        Stmt::Var {
            name: ident(name, 1),
            initializer: Some(value),
        }
    }

    fn print_var(name: &str) -> Stmt {
        Stmt::Print(Expr::Variable {
            name: ident(name, 1),
        })
    }

    fn interpreter() -> (Interpreter, MemoryLogger) {
        let logger = MemoryLogger::new();
        (Interpreter::with_logger(Box::new(logger.clone())), logger)
    }

    #[test]
    fn variable_declaration_and_assignment() {
        let (mut interpreter, _) = interpreter();
        let variable_token = ident("x", 1);

        assert!(interpreter.execute(&var("x", number(10.0))).is_ok());
        let result = interpreter.environment.borrow().get(&variable_token);
        assert_eq!(result.unwrap().to_string(), "10");

        let assign_stmt = Stmt::Expression(Expr::Assign {
            name: variable_token.clone(),
            value: Box::new(number(20.5)),
        });
        assert!(interpreter.execute(&assign_stmt).is_ok());

        let result = interpreter.environment.borrow().get(&variable_token);
        assert_eq!(result.unwrap().to_string(), "20.5");
    }

    #[test]
    fn uninitialized_variable_is_nil() {
        let (mut interpreter, logs) = interpreter();
        let mut diagnostics = Diagnostics::new();

        interpreter.interpret(
            &[
                Stmt::Var {
                    name: ident("x", 1),
                    initializer: None,
                },
                print_var("x"),
            ],
            &mut diagnostics,
        );

        assert_eq!(logs.lines(), vec![String::from("nil")]);
    }

    #[test]
    fn arithmetic_and_concatenation() {
        let (mut interpreter, _) = interpreter();

        let sum = binary(number(1.0), op(TokenType::Plus, "+"), number(2.0));
        assert!(matches!(interpreter.evaluate(&sum), Ok(Value::Number(n)) if n == 3.0));

        let concat = binary(string("a"), op(TokenType::Plus, "+"), string("b"));
        assert!(matches!(interpreter.evaluate(&concat), Ok(Value::String(s)) if s == "ab"));

        let product = binary(number(2.5), op(TokenType::Star, "*"), number(4.0));
        assert_eq!(interpreter.evaluate(&product).unwrap().to_string(), "10");
    }

    #[test]
    fn mixed_addition_is_a_type_error() {
        let (mut interpreter, _) = interpreter();

        let expr = binary(number(1.0), op(TokenType::Plus, "+"), string("a"));
        let error = interpreter.evaluate(&expr).unwrap_err();
        assert_eq!(error.message, "Operands must be two numbers or two strings.");
        assert_eq!(error.token.lexeme, "+");
    }

    #[test]
    fn comparisons_require_numbers() {
        let (mut interpreter, _) = interpreter();

        let less = binary(number(1.0), op(TokenType::Less, "<"), number(2.0));
        assert!(matches!(interpreter.evaluate(&less), Ok(Value::Boolean(true))));

        let bad = binary(string("a"), op(TokenType::Greater, ">"), number(2.0));
        assert_eq!(
            interpreter.evaluate(&bad).unwrap_err().message,
            "Operands must be numbers."
        );
    }

    #[test]
    fn equality_never_fails() {
        let (mut interpreter, _) = interpreter();
        let nil = || Expr::Literal {
            value: Literal::None,
        };
        let bool_false = Expr::Literal {
            value: Literal::Bool(false),
        };

        let cases = [
            (binary(number(2.0), op(TokenType::EqualEqual, "=="), number(2.0)), true),
            (binary(nil(), op(TokenType::EqualEqual, "=="), nil()), true),
            (binary(nil(), op(TokenType::EqualEqual, "=="), bool_false), false),
            (binary(string("1"), op(TokenType::BangEqual, "!="), number(1.0)), true),
        ];

        for (expr, expected) in cases {
            assert!(matches!(interpreter.evaluate(&expr), Ok(Value::Boolean(b)) if b == expected));
        }
    }

    #[test]
    fn unary_operators() {
        let (mut interpreter, _) = interpreter();

        let negate = Expr::Unary {
            operator: op(TokenType::Minus, "-"),
            right: Box::new(number(3.0)),
        };
        assert_eq!(interpreter.evaluate(&negate).unwrap().to_string(), "-3");

        let not_zero = Expr::Unary {
            operator: op(TokenType::Bang, "!"),
            right: Box::new(number(0.0)),
        };
        assert!(matches!(interpreter.evaluate(&not_zero), Ok(Value::Boolean(false))));

        let negate_string = Expr::Unary {
            operator: op(TokenType::Minus, "-"),
            right: Box::new(string("x")),
        };
        assert_eq!(
            interpreter.evaluate(&negate_string).unwrap_err().message,
            "Operand must be a number."
        );
    }

    #[test]
    fn division_by_zero_is_a_runtime_error() {
        let (mut interpreter, _) = interpreter();

        let expr = binary(number(1.0), op(TokenType::Slash, "/"), number(0.0));
        assert_eq!(interpreter.evaluate(&expr).unwrap_err().message, "Division by zero.");
    }

    #[test]
    fn assignment_to_undeclared_name_fails() {
        let (mut interpreter, _) = interpreter();
        let mut diagnostics = Diagnostics::new();

        let assign = Stmt::Expression(Expr::Assign {
            name: ident("ghost", 4),
            value: Box::new(number(1.0)),
        });
        interpreter.interpret(&[assign], &mut diagnostics);

        assert!(diagnostics.had_runtime_error());
        assert_eq!(
            diagnostics.reports()[0].to_string(),
            "Undefined variable 'ghost'.\n[line 4]"
        );
        assert!(interpreter.globals().borrow().get(&ident("ghost", 4)).is_err());
    }

    #[test]
    fn runtime_error_aborts_remaining_statements() {
        let (mut interpreter, logs) = interpreter();
        let mut diagnostics = Diagnostics::new();

        interpreter.interpret(
            &[
                Stmt::Print(number(1.0)),
                Stmt::Print(Expr::Variable {
                    name: ident("missing", 2),
                }),
                Stmt::Print(number(3.0)),
            ],
            &mut diagnostics,
        );

        assert_eq!(logs.lines(), vec![String::from("1")]);
        assert_eq!(diagnostics.reports().len(), 1);
    }

    #[test]
    fn block_restores_scope_after_error() {
        let (mut interpreter, _) = interpreter();
        let mut diagnostics = Diagnostics::new();

        interpreter.interpret(
            &[Stmt::Block(vec![
                var("inner", number(1.0)),
                Stmt::Print(Expr::Variable {
                    name: ident("missing", 3),
                }),
            ])],
            &mut diagnostics,
        );

        assert!(diagnostics.had_runtime_error());
        assert!(Rc::ptr_eq(&interpreter.environment, &interpreter.globals));
        assert!(interpreter.globals.borrow().get(&ident("inner", 1)).is_err());
    }

    #[test]
    fn variable_shadowing() {
        let (mut interpreter, logs) = interpreter();
        let mut diagnostics = Diagnostics::new();

        interpreter.interpret(
            &[
                var("x", number(1.0)),
                Stmt::Block(vec![var("x", number(2.0)), print_var("x")]),
                print_var("x"),
            ],
            &mut diagnostics,
        );

        assert_eq!(logs.lines(), vec![String::from("2"), String::from("1")]);
    }

    #[test]
    fn variable_scoping() {
        let (mut interpreter, logs) = interpreter();
        let mut diagnostics = Diagnostics::new();

        let statements = vec![
            var("a", string("global a")),
            var("b", string("global b")),
            var("c", string("global c")),
            Stmt::Block(vec![
                var("a", string("outer a")),
                var("b", string("outer b")),
                Stmt::Block(vec![
                    var("a", string("inner a")),
                    print_var("a"),
                    print_var("b"),
                    print_var("c"),
                ]),
                print_var("a"),
                print_var("b"),
                print_var("c"),
            ]),
            print_var("a"),
            print_var("b"),
            print_var("c"),
        ];

        interpreter.interpret(&statements, &mut diagnostics);

        let expected_logs = vec![
            "inner a", "outer b", "global c", "outer a", "outer b", "global c", "global a",
            "global b", "global c",
        ];
        assert_eq!(logs.lines(), expected_logs);
    }

    #[test]
    fn operands_evaluate_left_to_right() {
        let (mut interpreter, logs) = interpreter();
        let mut diagnostics = Diagnostics::new();

        let assign = |value: f64| Expr::Assign {
            name: ident("a", 1),
            value: Box::new(number(value)),
        };
        interpreter.interpret(
            &[
                var("a", number(0.0)),
                Stmt::Print(binary(assign(1.0), op(TokenType::Minus, "-"), assign(5.0))),
                print_var("a"),
            ],
            &mut diagnostics,
        );

        assert_eq!(logs.lines(), vec![String::from("-4"), String::from("5")]);
    }
}
