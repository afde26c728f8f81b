use crate::syntax::{
    expr::{self, Expr},
    stmt::{self, Stmt},
    token::Literal,
};

/// Renders syntax trees in a fully parenthesized prefix form, e.g.
/// `(* (- 123) (group 45.67))`. Only used for debugging parser output.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(&mut self, expr: &Expr) -> String {
        expr::Visitor::visit_expr(self, expr)
    }

    pub fn print_stmt(&mut self, stmt: &Stmt) -> String {
        stmt::Visitor::visit_stmt(self, stmt)
    }

    fn parenthesize(&mut self, name: &str, exprs: &[&Expr]) -> String {
        let mut string = String::from("(");
        string.push_str(name);

        for expr in exprs {
            string.push(' ');
            string.push_str(&self.print(expr));
        }

        string.push(')');
        string
    }
}

impl expr::Visitor<String> for AstPrinter {
    fn visit_expr(&mut self, expr: &Expr) -> String {
        match expr {
            Expr::Grouping { expression } => self.parenthesize("group", &[&**expression]),
            Expr::Unary { operator, right } => self.parenthesize(&operator.lexeme, &[&**right]),
            Expr::Literal { value } => match value {
                Literal::Number(value) => value.to_string(),
                Literal::String(value) => value.to_string(),
                Literal::Bool(value) => value.to_string(),
                Literal::None => String::from("nil"),
            },
            Expr::Binary {
                left,
                operator,
                right,
            } => self.parenthesize(&operator.lexeme, &[&**left, &**right]),
            Expr::Variable { name } => name.lexeme.clone(),
            Expr::Assign { name, value } => {
                format!("(= {} {})", name.lexeme, self.print(value))
            }
        }
    }
}

impl stmt::Visitor<String> for AstPrinter {
    fn visit_stmt(&mut self, stmt: &Stmt) -> String {
        match stmt {
            Stmt::Expression(expr) => self.parenthesize(";", &[expr]),
            Stmt::Print(expr) => self.parenthesize("print", &[expr]),
            Stmt::Var {
                name,
                initializer: Some(initializer),
            } => format!("(var {} {})", name.lexeme, self.print(initializer)),
            Stmt::Var {
                name,
                initializer: None,
            } => format!("(var {})", name.lexeme),
            Stmt::Block(statements) => {
                let mut string = String::from("(block");
                for statement in statements {
                    string.push(' ');
                    string.push_str(&self.print_stmt(statement));
                }
                string.push(')');
                string
            }
        }
    }
}
